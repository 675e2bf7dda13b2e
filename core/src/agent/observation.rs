/// Render tool outputs as the follow-up input of the next turn.
///
/// ```text
/// - observations
///     - <name>
///       - <value>
/// ```
pub fn format_observations<'a, I>(observations: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut message = String::from("- observations\n");
    for (name, value) in observations {
        message.push_str("    - ");
        message.push_str(name);
        message.push('\n');
        message.push_str("      - ");
        message.push_str(value);
        message.push('\n');
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_each_observation_on_two_lines() {
        let msg = format_observations([("read-file", "fn main() {}"), ("note", "ok")]);
        assert_eq!(
            msg,
            "- observations\n    - read-file\n      - fn main() {}\n    - note\n      - ok\n"
        );
    }

    #[test]
    fn empty_observations_keep_header() {
        assert_eq!(format_observations([]), "- observations\n");
    }
}
