//! Rewrite named placeholders (`:param`) to positional ones (`$n`).
//!
//! Dynamic templates are written with named parameters resolved from request
//! query strings; PostgreSQL's wire protocol only takes positional parameters.
//! The scanner leaves string literals, quoted identifiers, comments and `::`
//! casts untouched; repeated names reuse one ordinal.

/// A template rewritten to positional form. `params` holds the distinct
/// parameter names in ordinal order ($1 = params[0]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedQuery {
    pub sql: String,
    pub params: Vec<String>,
}

pub fn to_positional(template: &str) -> NamedQuery {
    let bytes = template.as_bytes();
    let mut sql = String::with_capacity(template.len());
    let mut params: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            '\'' => i = copy_quoted(template, i, '\'', &mut sql),
            '"' => i = copy_quoted(template, i, '"', &mut sql),
            '-' if bytes.get(i + 1) == Some(&b'-') => i = copy_line_comment(template, i, &mut sql),
            '/' if bytes.get(i + 1) == Some(&b'*') => i = copy_block_comment(template, i, &mut sql),
            ':' => {
                // `::` is a cast, not a parameter.
                if bytes.get(i + 1) == Some(&b':') {
                    sql.push_str("::");
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_ident_byte(bytes[end], end == start) {
                    end += 1;
                }
                if end == start {
                    sql.push(':');
                    i += 1;
                    continue;
                }
                let name = &template[start..end];
                let ordinal = match params.iter().position(|p| p == name) {
                    Some(pos) => pos + 1,
                    None => {
                        params.push(name.to_string());
                        params.len()
                    }
                };
                sql.push('$');
                sql.push_str(&ordinal.to_string());
                i = end;
            }
            _ => {
                // Every state transition is on an ASCII byte; anything else is
                // copied through one whole character at a time.
                let ch_len = template[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                sql.push_str(&template[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    NamedQuery { sql, params }
}

fn is_ident_byte(b: u8, first: bool) -> bool {
    b == b'_' || b.is_ascii_alphabetic() || (!first && b.is_ascii_digit())
}

/// Copy a quoted region verbatim. A doubled quote is the SQL escape and stays
/// inside the region.
fn copy_quoted(template: &str, start: usize, quote: char, out: &mut String) -> usize {
    let bytes = template.as_bytes();
    let q = quote as u8;
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == q {
            if bytes.get(i + 1) == Some(&q) {
                i += 2;
                continue;
            }
            i += 1;
            break;
        }
        i += 1;
    }
    out.push_str(&template[start..i]);
    i
}

fn copy_line_comment(template: &str, start: usize, out: &mut String) -> usize {
    let end = template[start..]
        .find('\n')
        .map(|n| start + n)
        .unwrap_or(template.len());
    out.push_str(&template[start..end]);
    end
}

fn copy_block_comment(template: &str, start: usize, out: &mut String) -> usize {
    let end = template[start + 2..]
        .find("*/")
        .map(|n| start + 2 + n + 2)
        .unwrap_or(template.len());
    out.push_str(&template[start..end]);
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rewrites_named_parameters_in_order() {
        let q = to_positional(
            "SELECT substation_id FROM network.substations WHERE status = :status AND voltage_level_kv > :min_kv",
        );
        assert_eq!(
            q.sql,
            "SELECT substation_id FROM network.substations WHERE status = $1 AND voltage_level_kv > $2"
        );
        assert_eq!(q.params, vec!["status".to_string(), "min_kv".to_string()]);
    }

    #[test]
    fn repeated_names_share_one_ordinal() {
        let q = to_positional("SELECT * FROM t WHERE a = :x OR b = :x OR c = :y");
        assert_eq!(q.sql, "SELECT * FROM t WHERE a = $1 OR b = $1 OR c = $2");
        assert_eq!(q.params, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn casts_are_not_parameters() {
        let q = to_positional("SELECT created_at::date FROM t WHERE id = :id");
        assert_eq!(q.sql, "SELECT created_at::date FROM t WHERE id = $1");
        assert_eq!(q.params, vec!["id".to_string()]);
    }

    #[test]
    fn string_literals_and_quoted_identifiers_are_untouched() {
        let q = to_positional(r#"SELECT ':not_a_param', "weird:col" FROM t WHERE s = :s"#);
        assert_eq!(q.sql, r#"SELECT ':not_a_param', "weird:col" FROM t WHERE s = $1"#);
        assert_eq!(q.params, vec!["s".to_string()]);
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        let q = to_positional("SELECT 'it''s :fine' WHERE x = :x");
        assert_eq!(q.sql, "SELECT 'it''s :fine' WHERE x = $1");
        assert_eq!(q.params, vec!["x".to_string()]);
    }

    #[test]
    fn comments_are_untouched() {
        let q = to_positional("SELECT 1 -- :nope\n/* :also_nope */ WHERE a = :a");
        assert_eq!(q.sql, "SELECT 1 -- :nope\n/* :also_nope */ WHERE a = $1");
        assert_eq!(q.params, vec!["a".to_string()]);
    }

    #[test]
    fn template_without_parameters_is_unchanged() {
        let q = to_positional("SELECT COUNT(*) FROM network.meters");
        assert_eq!(q.sql, "SELECT COUNT(*) FROM network.meters");
        assert!(q.params.is_empty());
    }

    #[test]
    fn non_ascii_text_passes_through() {
        let q = to_positional("SELECT 'nœud célèbre' AS libellé WHERE x = :x");
        assert_eq!(q.sql, "SELECT 'nœud célèbre' AS libellé WHERE x = $1");
        assert_eq!(q.params, vec!["x".to_string()]);
    }

    #[test]
    fn bare_colon_passes_through() {
        let q = to_positional("SELECT 'a' : 'b'");
        assert_eq!(q.sql, "SELECT 'a' : 'b'");
        assert!(q.params.is_empty());
    }
}
