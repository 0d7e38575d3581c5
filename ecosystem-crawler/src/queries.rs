//! Search query matrix construction.
//!
//! The GitHub code search API truncates results per query, so every search
//! intent (an "axis": filename or extension paired with a keyword) is
//! multiplied by a sequence of file-size partitions to raise effective recall.

/// One fixed (filename/extension, keyword) pairing defining a search intent.
#[derive(Debug, Clone)]
pub struct QueryAxis {
    filename: Option<String>,
    extension: Option<String>,
    keyword: String,
}

impl QueryAxis {
    /// Creates an axis matching a keyword inside files with a given name.
    pub fn filename(filename: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            extension: None,
            keyword: keyword.into(),
        }
    }

    /// Creates an axis matching a keyword inside files with a given extension.
    pub fn extension(extension: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            filename: None,
            extension: Some(extension.into()),
            keyword: keyword.into(),
        }
    }
}

/// A single code search query, rendered as space-joined `key:value` tokens.
///
/// Built only from a [`QueryAxis`] and a size range, so at least one of
/// filename/extension/keyword is always present.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    filename: Option<String>,
    extension: Option<String>,
    keyword: Option<String>,
    size_range: Option<String>,
    in_qualifier: Option<String>,
}

impl SearchQuery {
    fn from_axis(axis: &QueryAxis, size_range: &str) -> Self {
        Self {
            filename: axis.filename.clone(),
            extension: axis.extension.clone(),
            keyword: Some(axis.keyword.clone()),
            size_range: Some(size_range.to_string()),
            in_qualifier: None,
        }
    }

    /// Renders the query string sent to the search endpoint.
    ///
    /// The keyword is rendered bare; all other fields become `key:value`
    /// tokens.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(filename) = &self.filename {
            parts.push(format!("filename:{filename}"));
        }
        if let Some(extension) = &self.extension {
            parts.push(format!("extension:{extension}"));
        }
        if let Some(keyword) = &self.keyword {
            parts.push(keyword.clone());
        }
        if let Some(size_range) = &self.size_range {
            parts.push(format!("size:{size_range}"));
        }
        if let Some(in_qualifier) = &self.in_qualifier {
            parts.push(format!("in:{in_qualifier}"));
        }
        parts.join(" ")
    }
}

/// Generates the file-size partitions applied to every axis.
///
/// Contiguous 1500-byte bands from 0 to 3000, then a single wide band up to
/// 15000. The bands are non-overlapping and cover 0..15000.
#[must_use]
pub fn size_ranges() -> Vec<String> {
    let mut ranges = Vec::new();
    let mut start = 0u32;

    while start < 3000 {
        let step = 1500;
        ranges.push(format!("{start}..{}", start + step));
        start += step;
    }

    while start < 15000 {
        let step = 12000;
        ranges.push(format!("{start}..{}", start + step));
        start += step;
    }

    ranges
}

/// Builds the full query matrix: every axis crossed with every size range.
///
/// Axis is the outer loop, size range the inner loop. The order is stable for
/// log readability only.
#[must_use]
pub fn build_matrix(axes: &[QueryAxis]) -> Vec<SearchQuery> {
    let ranges = size_ranges();
    let mut matrix = Vec::with_capacity(axes.len() * ranges.len());

    for axis in axes {
        for range in &ranges {
            matrix.push(SearchQuery::from_axis(axis, range));
        }
    }

    matrix
}

/// The built-in axis list for the Compound ecosystem.
///
/// Package manifests and lockfiles crossed with the ecosystem's package
/// identifiers, plus one Solidity query for the Comet interface name.
#[must_use]
pub fn default_axes() -> Vec<QueryAxis> {
    vec![
        QueryAxis::filename("package.json", "compound-finance/compound-js"),
        QueryAxis::filename("package-lock.json", "compound-finance/compound-js"),
        QueryAxis::filename("yarn.lock", "compound-finance/compound-js"),
        QueryAxis::filename("package.json", "compound-finance/comet-extension"),
        QueryAxis::filename("package-lock.json", "compound-finance/comet-extension"),
        QueryAxis::filename("yarn.lock", "compound-finance/comet-extension"),
        QueryAxis::filename("package.json", "compound-config"),
        QueryAxis::filename("package-lock.json", "compound-finance/compound-config"),
        QueryAxis::filename("yarn.lock", "compound-finance/compound-config"),
        QueryAxis::filename("package.json", "compound-styles"),
        QueryAxis::filename("package-lock.json", "compound-finance/compound-config"),
        QueryAxis::filename("yarn.lock", "compound-finance/compound-config"),
        QueryAxis::filename("package.json", "compound-comet"),
        QueryAxis::filename("package-lock.json", "compound-finance/compound-comet"),
        QueryAxis::filename("yarn.lock", "compound-finance/compound-comet"),
        QueryAxis::extension("sol", "IComet"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_filename_query() {
        let query = SearchQuery::from_axis(
            &QueryAxis::filename("package.json", "compound-config"),
            "0..1500",
        );
        assert_eq!(
            query.to_query_string(),
            "filename:package.json compound-config size:0..1500"
        );
    }

    #[test]
    fn renders_extension_query() {
        let query = SearchQuery::from_axis(&QueryAxis::extension("sol", "IComet"), "3000..15000");
        assert_eq!(query.to_query_string(), "extension:sol IComet size:3000..15000");
    }

    #[test]
    fn size_ranges_are_contiguous_and_cover_target_span() {
        let ranges = size_ranges();
        assert!(!ranges.is_empty());

        let parsed: Vec<(u32, u32)> = ranges
            .iter()
            .map(|range| {
                let (start, end) = range.split_once("..").unwrap();
                (start.parse().unwrap(), end.parse().unwrap())
            })
            .collect();

        assert_eq!(parsed.first().unwrap().0, 0);
        assert!(parsed.last().unwrap().1 >= 15000);

        for window in parsed.windows(2) {
            assert_eq!(window[0].1, window[1].0, "gap between consecutive ranges");
        }
    }

    #[test]
    fn matrix_is_full_cartesian_product() {
        let axes = vec![
            QueryAxis::filename("package.json", "compound-config"),
            QueryAxis::extension("sol", "IComet"),
        ];
        let matrix = build_matrix(&axes);

        assert_eq!(matrix.len(), axes.len() * size_ranges().len());

        // Axis is the outer loop: the first chunk all share the first axis.
        let per_axis = size_ranges().len();
        for query in &matrix[..per_axis] {
            assert!(query.to_query_string().starts_with("filename:package.json"));
        }
        for query in &matrix[per_axis..] {
            assert!(query.to_query_string().starts_with("extension:sol"));
        }
    }

    #[test]
    fn every_size_range_appears_per_axis() {
        let axes = vec![QueryAxis::filename("yarn.lock", "compound-comet")];
        let matrix = build_matrix(&axes);

        for (query, range) in matrix.iter().zip(size_ranges()) {
            assert!(query.to_query_string().contains(&format!("size:{range}")));
        }
    }
}
