//! Path templates with `:name` placeholders.

use std::fmt::Display;

/// Substitute placeholders in a path template.
///
/// Every occurrence of each key is replaced by the value's `Display` text.
/// Keys are matched as plain substrings, not whole path segments, and
/// placeholders without a substitution stay in the output untouched.
///
/// ```
/// use glapi::expand_url;
///
/// let path = expand_url("/projects/:id/keys", &[(":id", &42)]);
/// assert_eq!(path, "/projects/42/keys");
/// ```
pub fn expand_url(template: &str, substitutions: &[(&str, &dyn Display)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |path, (key, value)| {
            path.replace(key, &value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_single_placeholder() {
        assert_eq!(
            expand_url("/projects/:id/keys", &[(":id", &"42")]),
            "/projects/42/keys"
        );
    }

    #[test]
    fn test_expand_replaces_every_occurrence() {
        assert_eq!(
            expand_url("/a/:id/b/:id", &[(":id", &7)]),
            "/a/7/b/7"
        );
    }

    #[test]
    fn test_expand_multiple_keys() {
        let path = expand_url(
            "/projects/:id/members/:user_id",
            &[(":id", &3), (":user_id", &9)],
        );
        assert_eq!(path, "/projects/3/members/9");
    }

    #[test]
    fn test_unresolved_placeholder_is_left_verbatim() {
        assert_eq!(
            expand_url("/projects/:id/issues/:issue_id", &[(":id", &1)]),
            "/projects/1/issues/:issue_id"
        );
    }

    #[test]
    fn test_substring_match_is_not_segment_bound() {
        // ":id" also matches inside ":idx".
        assert_eq!(expand_url("/x/:idx", &[(":id", &5)]), "/x/5x");
    }

    #[test]
    fn test_no_substitutions() {
        assert_eq!(expand_url("/user", &[]), "/user");
    }
}
