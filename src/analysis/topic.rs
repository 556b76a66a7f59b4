use std::fmt;

/// Dataset a query is answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SalesByMonth,
    SalesByCategory,
    TopProducts,
    UsersByCity,
    UsersByAge,
    OrdersByStatus,
    SalesByQuarter,
    PaymentsByMethod,
}

impl Topic {
    /// Returned when no keyword group matches.
    pub const DEFAULT: Topic = Topic::SalesByMonth;

    pub const ALL: [Topic; 8] = [
        Topic::SalesByMonth,
        Topic::SalesByCategory,
        Topic::TopProducts,
        Topic::UsersByCity,
        Topic::UsersByAge,
        Topic::OrdersByStatus,
        Topic::SalesByQuarter,
        Topic::PaymentsByMethod,
    ];

    /// Dataset store key.
    pub fn key(&self) -> &'static str {
        match self {
            Topic::SalesByMonth => "sales_by_month",
            Topic::SalesByCategory => "sales_by_category",
            Topic::TopProducts => "top_products",
            Topic::UsersByCity => "users_by_city",
            Topic::UsersByAge => "users_by_age",
            Topic::OrdersByStatus => "orders_by_status",
            Topic::SalesByQuarter => "sales_by_quarter",
            Topic::PaymentsByMethod => "payments_by_method",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Bumped whenever [`KEYWORD_TABLE`] is reordered or its groups change.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

/// Keyword groups in evaluation order; the first group with any match wins.
///
/// Specific groups come before the generic sales/month group, which would
/// otherwise swallow almost every commerce query. `销量` (sales volume) is a
/// product ranking term and lives only in the product group.
pub const KEYWORD_TABLE: &[(Topic, &[&str])] = &[
    (Topic::SalesByQuarter, &["quarter", "季度"]),
    (Topic::PaymentsByMethod, &["payment", "支付", "付款"]),
    (Topic::OrdersByStatus, &["status", "状态"]),
    (Topic::UsersByCity, &["city", "城市", "地区"]),
    (Topic::UsersByAge, &["age", "年龄"]),
    (Topic::SalesByCategory, &["category", "类别", "分类"]),
    (Topic::TopProducts, &["product", "产品", "商品", "销量", "top"]),
    (Topic::SalesByMonth, &["month", "sales", "销售额", "月"]),
];

/// Classifies generated SQL (or a raw query) by substring matching.
///
/// Not a SQL parser: a keyword anywhere in the text counts, including inside
/// unrelated clauses or longer words.
pub fn resolve(text: &str) -> Topic {
    let lowered = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::DEFAULT)
}
