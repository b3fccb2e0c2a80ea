const PROXY_PREFIX: [&str; 4] = ["api", "datasources", "proxy", "uid"];

/// Path segments of `path` under the datasource proxy for `datasource_uid`.
pub(crate) fn proxy_segments<'a>(datasource_uid: &'a str, path: &[&'a str]) -> Vec<&'a str> {
    let mut segments = Vec::with_capacity(PROXY_PREFIX.len() + 1 + path.len());
    segments.extend_from_slice(&PROXY_PREFIX);
    segments.push(datasource_uid);
    segments.extend_from_slice(path);
    segments
}

#[cfg(test)]
mod tests {
    use super::proxy_segments;

    #[test]
    fn datasource_uid_is_a_single_segment() {
        assert_eq!(
            proxy_segments("loki-1", &["loki", "api", "v1", "labels"]),
            vec!["api", "datasources", "proxy", "uid", "loki-1", "loki", "api", "v1", "labels"]
        );
    }
}
