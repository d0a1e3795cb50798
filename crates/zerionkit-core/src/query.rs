//! Query-string construction in the API's bracket notation.
//!
//! Filters flatten to `filter[name]=a,b,c`, pagination to `page[size]` /
//! `page[after]`, and sort keys take a `-` prefix for descending order.

use url::form_urlencoded;

/// Ordered set of query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw key/value pair.
    pub fn raw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// `filter[name]=value`
    pub fn filter(self, name: &str, value: impl Into<String>) -> Self {
        self.raw(format!("filter[{name}]"), value)
    }

    /// `filter[name]=a,b,c` — empty lists are omitted entirely.
    pub fn filter_list<S: AsRef<str>>(self, name: &str, values: &[S]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(name, joined)
    }

    /// `sort=key` (prefix the key with `-` for descending).
    pub fn sort(self, key: impl Into<String>) -> Self {
        self.raw("sort", key)
    }

    /// `page[size]=n`
    pub fn page_size(self, size: u32) -> Self {
        self.raw("page[size]", size.to_string())
    }

    /// `page[after]=cursor` — omitted when no cursor is in hand.
    pub fn page_after(self, cursor: Option<String>) -> Self {
        match cursor {
            Some(cursor) => self.raw("page[after]", cursor),
            None => self,
        }
    }

    /// `include=a,b`
    pub fn include<S: AsRef<str>>(self, values: &[S]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.raw("include", joined)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Join onto a path: `path` unchanged when empty, `path?query` otherwise.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_flatten_to_bracket_notation() {
        let qs = QueryParams::new()
            .filter_list("chain_ids", &["ethereum", "polygon"])
            .to_query_string();
        assert_eq!(qs, "filter%5Bchain_ids%5D=ethereum%2Cpolygon");
    }

    #[test]
    fn empty_list_filter_is_omitted() {
        let qs = QueryParams::new().filter_list::<&str>("chain_ids", &[]);
        assert!(qs.is_empty());
    }

    #[test]
    fn descending_sort_keeps_its_prefix() {
        let qs = QueryParams::new().sort("-market_data.market_cap").to_query_string();
        assert_eq!(qs, "sort=-market_data.market_cap");
    }

    #[test]
    fn pagination_params() {
        let qs = QueryParams::new()
            .page_size(100)
            .page_after(Some("abc".into()))
            .to_query_string();
        assert_eq!(qs, "page%5Bsize%5D=100&page%5Bafter%5D=abc");

        let no_cursor = QueryParams::new().page_size(100).page_after(None);
        assert_eq!(no_cursor.to_query_string(), "page%5Bsize%5D=100");
    }

    #[test]
    fn append_to_path() {
        let empty = QueryParams::new();
        assert_eq!(empty.append_to("/v1/chains/"), "/v1/chains/");

        let qs = QueryParams::new().filter("positions", "only_simple");
        assert_eq!(
            qs.append_to("/v1/wallets/0xabc/portfolio"),
            "/v1/wallets/0xabc/portfolio?filter%5Bpositions%5D=only_simple"
        );
    }
}
