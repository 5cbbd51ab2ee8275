use regex::Regex;
use shared_types::PageText;

/// Split a document's ordered pages into logical forms.
///
/// A page whose text matches the form-start marker opens a new form;
/// pages without a marker are appended to the current form. Leading pages
/// with no marker still open an implicit first form, so no page is ever
/// dropped. Returned groups hold positions into `pages`, in document
/// order.
pub(crate) fn group_into_forms(pages: &[PageText], marker: &Regex) -> Vec<Vec<usize>> {
    let mut forms: Vec<Vec<usize>> = Vec::new();
    for (position, page) in pages.iter().enumerate() {
        let starts_new_form = marker.is_match(&page.text());
        match forms.last_mut() {
            Some(current) if !starts_new_form => current.push(position),
            _ => forms.push(vec![position]),
        }
    }
    forms
}
