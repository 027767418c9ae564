//! Formset reconciliation.
//!
//! A formset is a variable-length list of sub-forms bound to one array-valued
//! field. Rows equal to the formset's blank row at the end of the list are
//! padding: they are trimmed before saving and re-added before rendering, so
//! a list never grows a tail of blank rows.

use crate::hidden::HiddenField;

pub const TOTAL_FORMS: &str = "TOTAL_FORMS";
pub const INITIAL_FORMS: &str = "INITIAL_FORMS";
pub const MIN_NUM_FORMS: &str = "MIN_NUM_FORMS";
pub const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";

/// Largest `TOTAL_FORMS` accepted from a POST body unless configured otherwise.
pub const DEFAULT_ABSOLUTE_MAX: usize = 1000;

/// Rows to render plus how many of them existed before padding.
#[derive(Debug, Clone, PartialEq)]
pub struct FormsetCollection<T> {
    pub items: Vec<T>,
    pub initial_forms: usize,
}

impl<T> FormsetCollection<T> {
    pub fn total_forms(&self) -> usize {
        self.items.len()
    }
}

/// Input to [`add_empty_forms`].
#[derive(Debug, Clone)]
pub struct AddEmptyForms<'a, T> {
    pub items: Vec<T>,
    /// Blank row; `None` turns the formset into a fixed list.
    pub empty_form: Option<&'a T>,
    /// Row limit; `None` means unbounded.
    pub max_num: Option<usize>,
    pub extra: usize,
    /// Once client-side scripting runs, at most one blank row is shown.
    pub is_mounted: bool,
}

impl<'a, T> AddEmptyForms<'a, T> {
    pub fn new(items: Vec<T>, empty_form: Option<&'a T>) -> Self {
        Self {
            items,
            empty_form,
            max_num: None,
            extra: 1,
            is_mounted: false,
        }
    }

    pub fn max_num(mut self, max_num: Option<usize>) -> Self {
        self.max_num = max_num;
        self
    }

    pub fn extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self
    }

    pub fn mounted(mut self, is_mounted: bool) -> Self {
        self.is_mounted = is_mounted;
        self
    }
}

/// Strip the maximal run of trailing rows equal to `empty`.
///
/// Rows in the middle of the list are never touched.
pub fn remove_empty_forms_at_end<T: PartialEq>(mut items: Vec<T>, empty: Option<&T>) -> Vec<T> {
    let Some(empty) = empty else {
        return items;
    };
    while items.last().is_some_and(|last| last == empty) {
        items.pop();
    }
    items
}

/// Trim trailing blanks, then pad with fresh blanks up to `extra`.
pub fn add_empty_forms<T: PartialEq + Clone>(options: AddEmptyForms<'_, T>) -> FormsetCollection<T> {
    let AddEmptyForms {
        items,
        empty_form,
        max_num,
        extra,
        is_mounted,
    } = options;

    let Some(empty) = empty_form else {
        let initial_forms = items.len();
        return FormsetCollection {
            items,
            initial_forms,
        };
    };

    let mut items = remove_empty_forms_at_end(items, Some(empty));
    let initial_forms = items.len();
    let extra = if is_mounted { extra.min(1) } else { extra };
    let limit = max_num.unwrap_or(usize::MAX);

    for _ in 0..extra {
        if items.len() >= limit {
            break;
        }
        items.push(empty.clone());
    }

    FormsetCollection {
        items,
        initial_forms,
    }
}

/// Replace row `index` (appending when it is one past the end) and re-trim.
///
/// Editing a padding row back to blank therefore never leaves two blank rows
/// at the end of the list.
pub fn set_row<T: PartialEq>(mut items: Vec<T>, index: usize, row: T, empty: Option<&T>) -> Vec<T> {
    if index < items.len() {
        items[index] = row;
    } else {
        items.push(row);
    }
    remove_empty_forms_at_end(items, empty)
}

/// Bookkeeping fields a server-side formset expects in a POST body.
pub fn management_fields<T>(
    prefix: &str,
    collection: &FormsetCollection<T>,
    max_num: Option<usize>,
) -> Vec<HiddenField> {
    let mut fields = vec![
        HiddenField::new(format!("{prefix}-{TOTAL_FORMS}"), collection.total_forms()),
        HiddenField::new(format!("{prefix}-{INITIAL_FORMS}"), collection.initial_forms),
    ];
    if let Some(max_num) = max_num {
        fields.push(HiddenField::new(format!("{prefix}-{MIN_NUM_FORMS}"), 0));
        fields.push(HiddenField::new(format!("{prefix}-{MAX_NUM_FORMS}"), max_num));
    }
    fields
}
