//! Traces compiled into the binary, looked up by name when neither a file nor a URL matches.

/// Name and content of every bundled trace.
const RESOURCES: &[(&str, &str)] = &[("kahadb.log", include_str!("../resources/kahadb.log"))];

/// Content of the bundled trace called `name`. A leading `/` is ignored.
pub fn lookup(name: &str) -> Option<&'static str> {
    let name = name.strip_prefix('/').unwrap_or(name);
    RESOURCES
        .iter()
        .find(|(resource, _)| *resource == name)
        .map(|(_, content)| *content)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    RESOURCES.iter().map(|(name, _)| *name)
}
