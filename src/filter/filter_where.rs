use super::journey_filter::JourneyFilter;
use super::types::{FilterParam, SqlResult, TextMatch};

/// Renders a `JourneyFilter` into a parameterised WHERE clause over the `j` (journeys) alias.
pub struct FilterWhere {
    param_values: Vec<FilterParam>,
    conditions: Vec<String>,
}

impl FilterWhere {
    fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    pub fn generate(filter: &JourneyFilter) -> SqlResult {
        let mut filter_where = Self::new();
        filter_where.build(filter);

        let clause = if filter_where.conditions.is_empty() {
            "1=1".to_string()
        } else {
            filter_where.conditions.join(" AND ")
        };

        SqlResult {
            clause,
            params: filter_where.param_values,
        }
    }

    fn build(&mut self, filter: &JourneyFilter) {
        match &filter.text {
            TextMatch::Route { from, to } => {
                if let Some(from) = from {
                    let sql = self.contains("j.start_location_folded", from);
                    self.conditions.push(sql);
                }
                if let Some(to) = to {
                    let sql = self.contains("j.end_location_folded", to);
                    self.conditions.push(sql);
                }
            }
            TextMatch::Search(needle) => {
                // Title, description, highlights and transportation, one array element each
                let sql = self.any_element_contains("j.search_terms_folded", needle);
                self.conditions.push(sql);
            }
            TextMatch::Location(needle) => {
                let parts = vec![
                    self.contains("j.start_location_folded", needle),
                    self.contains("j.end_location_folded", needle),
                ];
                self.conditions.push(format!("({})", parts.join(" OR ")));
            }
            TextMatch::All => {}
        }

        if let Some(after) = filter.starts_after {
            let p = self.param(FilterParam::Timestamp(after));
            self.conditions.push(format!("j.start_date >= {}", p));
        }
        if let Some(before) = filter.starts_before {
            let p = self.param(FilterParam::Timestamp(before));
            self.conditions.push(format!("j.start_date <= {}", p));
        }
    }

    /// Case-insensitive substring match against a folded column
    fn contains(&mut self, column: &str, needle: &str) -> String {
        let p = self.param(FilterParam::Text(like_pattern(needle)));
        format!("{} LIKE {} ESCAPE '\\'", column, p)
    }

    /// Case-insensitive substring match against any element of a folded JSON array column
    fn any_element_contains(&mut self, column: &str, needle: &str) -> String {
        let p = self.param(FilterParam::Text(like_pattern(needle)));
        format!(
            "EXISTS (SELECT 1 FROM json_each({}) AS e WHERE e.value LIKE {} ESCAPE '\\')",
            column, p
        )
    }

    fn param(&mut self, value: FilterParam) -> String {
        self.param_values.push(value);
        "?".to_string()
    }
}

/// Case folding shared by stored search columns and user needles
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Fold user text and wrap it in `%…%`, escaping LIKE wildcards so they match literally
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in fold(needle).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
