//! Line parsing for generated task and role lists.
//!
//! The generator is asked to answer with one `left | right` pair per line.
//! These functions are pure text handling: lines that do not contain exactly
//! one delimiter are dropped without error.
//!
//! | Function | Line format |
//! |----------|-------------|
//! | [`parse_delimited_lines`] | `task description \| assignee name` |
//! | [`parse_role_lines`] | `role name \| skill1, skill2, skill3` |

/// Separator between the two columns of a generated line
pub const LINE_DELIMITER: char = '|';

/// A role suggested for a team member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub role: String,
    pub skills: Vec<String>,
}

impl RoleSpec {
    pub fn new<I, S>(role: impl Into<String>, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            skills: skills.into_iter().map(Into::into).collect(),
        }
    }
}

/// Split each line holding exactly one delimiter into a trimmed pair.
///
/// # Examples
///
/// ```
/// use crew_domain::plan::parsing::parse_delimited_lines;
///
/// let pairs = parse_delimited_lines("Design schema | Alice\nnoise\na | b | c");
/// assert_eq!(pairs, vec![("Design schema".to_string(), "Alice".to_string())]);
/// ```
pub fn parse_delimited_lines(text: &str) -> Vec<(String, String)> {
    text.trim()
        .lines()
        .filter_map(|line| {
            let mut parts = line.split(LINE_DELIMITER);
            let left = parts.next()?;
            let right = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            Some((left.trim().to_string(), right.trim().to_string()))
        })
        .collect()
}

/// Parse `role | skill, skill` lines into role specs
pub fn parse_role_lines(text: &str) -> Vec<RoleSpec> {
    parse_delimited_lines(text)
        .into_iter()
        .map(|(role, skills)| RoleSpec {
            role,
            skills: skills.split(',').map(|s| s.trim().to_string()).collect(),
        })
        .collect()
}
