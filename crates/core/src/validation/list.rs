//! List payload rules.

use crate::list::{ListPatch, NewList};

use super::rules::ValidationErrors;

/// Maximum length of a list name, in characters.
pub const LIST_NAME_MAX_LEN: usize = 50;

fn check_name(name: &str, errors: &mut ValidationErrors) {
    let len = name.chars().count();
    if len == 0 {
        errors.push("name", "required", "List name is required");
    } else if len > LIST_NAME_MAX_LEN {
        errors.push("name", "max_length", "List name too long");
    }
}

/// Validate a creation payload, returning it with the name trimmed.
pub fn validate_new_list(input: &NewList) -> Result<NewList, ValidationErrors> {
    let name = input.name.trim().to_string();
    let mut errors = ValidationErrors::default();
    check_name(&name, &mut errors);
    errors.into_result(NewList { name })
}

/// Validate a partial update. Only fields that are present are checked, so
/// an empty patch is accepted.
pub fn validate_list_patch(patch: &ListPatch) -> Result<ListPatch, ValidationErrors> {
    let name = patch.name.as_deref().map(str::trim).map(str::to_string);
    let mut errors = ValidationErrors::default();
    if let Some(name) = &name {
        check_name(name, &mut errors);
    }
    errors.into_result(ListPatch { name })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_message(input: &NewList) -> String {
        validate_new_list(input)
            .unwrap_err()
            .first()
            .unwrap()
            .message
            .clone()
    }

    #[test]
    fn accepts_names_within_bounds() {
        for len in [1, 25, LIST_NAME_MAX_LEN] {
            let input = NewList::new("a".repeat(len));
            assert!(validate_new_list(&input).is_ok(), "length {len}");
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(first_message(&NewList::new("")), "List name is required");
    }

    #[test]
    fn whitespace_only_name_is_empty() {
        assert_eq!(first_message(&NewList::new("   ")), "List name is required");
    }

    #[test]
    fn rejects_long_name() {
        let input = NewList::new("a".repeat(LIST_NAME_MAX_LEN + 1));
        assert_eq!(first_message(&input), "List name too long");
    }

    #[test]
    fn normalizes_by_trimming() {
        let list = validate_new_list(&NewList::new("  Groceries ")).unwrap();
        assert_eq!(list.name, "Groceries");
    }

    #[test]
    fn empty_patch_is_accepted() {
        assert_eq!(
            validate_list_patch(&ListPatch::default()),
            Ok(ListPatch::default())
        );
    }

    #[test]
    fn patch_name_uses_same_rule() {
        let errors = validate_list_patch(&ListPatch::rename("")).unwrap_err();
        assert_eq!(errors.first().unwrap().message, "List name is required");

        let errors = validate_list_patch(&ListPatch::rename("x".repeat(51))).unwrap_err();
        assert_eq!(errors.first().unwrap().message, "List name too long");
    }
}
