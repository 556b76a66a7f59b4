use minijinja::{Environment, context};
use regex::Regex;
use std::sync::LazyLock;

use crate::data::schema::SchemaDescription;

pub const SQL_DIALECT: &str = "MySQL";
pub const INSIGHT_MIN_LENGTH: usize = 100;
pub const INSIGHT_MAX_LENGTH: usize = 150;

const SQL_TEMPLATE: &str = include_str!("../../templates/sql_prompt.txt");
const INSIGHT_TEMPLATE: &str = include_str!("../../templates/insight_prompt.txt");

// A fenced block anywhere in the reply; the language tag only counts when a
// newline follows it.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[\w.+-]*[ \t]*\r?\n)?(.*?)```").expect("valid fenced block regex")
});
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[\w.+-]*[ \t]*\r?\n?").expect("valid opening fence regex"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?```$").expect("valid closing fence regex"));

fn render(name: &'static str, source: &'static str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(name, source)?;
    env.get_template(name)?.render(ctx)
}

/// Prompt asking for a single SQL statement over `schema`.
pub fn build_sql_prompt(query: &str, schema: &SchemaDescription) -> Result<String, minijinja::Error> {
    let schema_json = serde_json::to_string_pretty(schema).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::BadSerialization, e.to_string())
    })?;

    render(
        "sql_prompt.txt",
        SQL_TEMPLATE,
        context! {
            query => query,
            schema => schema_json,
            dialect => SQL_DIALECT,
        },
    )
}

/// Prompt asking for a three-part insight about the retrieved data.
pub fn build_insight_prompt(query: &str, sql: &str, summary: &str) -> Result<String, minijinja::Error> {
    render(
        "insight_prompt.txt",
        INSIGHT_TEMPLATE,
        context! {
            query => query,
            sql => sql,
            summary => summary,
            min_length => INSIGHT_MIN_LENGTH,
            max_length => INSIGHT_MAX_LENGTH,
        },
    )
}

/// Removes markdown code fences a model wraps around its answer.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(captures) = FENCED_BLOCK.captures(trimmed) {
        return captures[1].trim().to_string();
    }

    // Unterminated or dangling fence
    let without_open = OPENING_FENCE.replace(trimmed, "");
    CLOSING_FENCE.replace(without_open.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_prompt_embeds_schema_and_dialect() {
        let prompt = build_sql_prompt("显示各城市用户分布", &SchemaDescription::builtin()).unwrap();

        assert!(prompt.contains("显示各城市用户分布"));
        assert!(prompt.contains("MySQL"));
        assert!(prompt.contains("\"users\": {"));
        assert!(prompt.contains("\"payment_method\""));
        assert!(prompt.contains("Return only the SQL code"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let schema = SchemaDescription::builtin();
        assert_eq!(
            build_sql_prompt("q", &schema).unwrap(),
            build_sql_prompt("q", &schema).unwrap()
        );
        assert_eq!(
            build_insight_prompt("q", "SELECT 1", "[1.0]").unwrap(),
            build_insight_prompt("q", "SELECT 1", "[1.0]").unwrap()
        );
    }

    #[test]
    fn test_insight_prompt_bounds_length_and_structure() {
        let prompt =
            build_insight_prompt("top selling products", "SELECT name FROM products", "[1520.0,1340.0]")
                .unwrap();

        assert!(prompt.contains("between 100 and 150 words"));
        assert!(prompt.contains("1. Trend"));
        assert!(prompt.contains("2. Key finding"));
        assert!(prompt.contains("3. Recommendation"));
        assert!(prompt.contains("same language as the user question"));
        assert!(prompt.contains("SELECT name FROM products"));
        assert!(prompt.contains("[1520.0,1340.0]"));
    }

    #[test]
    fn test_user_text_is_not_escaped() {
        let prompt = build_insight_prompt("a < b & c", "SELECT * FROM t WHERE x > 1", "[]").unwrap();
        assert!(prompt.contains("a < b & c"));
        assert!(prompt.contains("x > 1"));
    }

    #[test]
    fn test_strip_tagged_fence() {
        assert_eq!(
            strip_code_fences("```sql\nSELECT * FROM users;\n```"),
            "SELECT * FROM users;"
        );
        assert_eq!(strip_code_fences("```mysql\r\nSELECT 1\r\n```\n"), "SELECT 1");
    }

    #[test]
    fn test_strip_untagged_fence() {
        assert_eq!(strip_code_fences("```\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(strip_code_fences("```SELECT 1```"), "SELECT 1");
    }

    #[test]
    fn test_strip_keeps_plain_sql() {
        assert_eq!(strip_code_fences("  SELECT city FROM users  \n"), "SELECT city FROM users");
    }

    #[test]
    fn test_strip_fence_surrounded_by_prose() {
        let reply = "Here is the query:\n```sql\nSELECT city FROM users;\n```\nHope it helps.";
        assert_eq!(strip_code_fences(reply), "SELECT city FROM users;");
    }

    #[test]
    fn test_strip_dangling_fences() {
        assert_eq!(strip_code_fences("```sql\nSELECT 1"), "SELECT 1");
        assert_eq!(strip_code_fences("SELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_strip_fence_only_reply_is_empty() {
        assert_eq!(strip_code_fences("```sql\n```"), "");
    }
}
