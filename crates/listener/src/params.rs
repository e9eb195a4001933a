//! Parameter extraction for the trigger route.
//!
//! Parameters may arrive in the URL query, in an
//! `application/x-www-form-urlencoded` body, or both. Body values are looked
//! at first, and for each name the first value seen wins. An empty value is
//! the same as an absent one.

use std::collections::HashMap;

use reporting::{BuildId, BuildRef, Organization, ProjectId, Repository};

use crate::TriggerError;

pub const BUILD_ID: &str = "buildID";
pub const PROJECT: &str = "project";
pub const ORG: &str = "org";
pub const REPO: &str = "repo";
pub const CONTEXT: &str = "context";

/// A validated trigger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    pub build: BuildRef,
    pub org: Organization,
    pub repo: Repository,
    /// Raw, unsanitised context suffix.
    pub context: Option<String>,
}

/// Merges body and query parameters and validates the required ones.
///
/// `form_body` should be `None` unless the request declared a form content type.
pub fn parse(query: Option<&str>, form_body: Option<&[u8]>) -> Result<TriggerRequest, TriggerError> {
    let mut values: HashMap<String, String> = HashMap::new();

    if let Some(body) = form_body {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| TriggerError::MalformedBody(e.to_string()))?;
        merge(&mut values, pairs);
    }
    if let Some(query) = query {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| TriggerError::MalformedBody(e.to_string()))?;
        merge(&mut values, pairs);
    }

    let mut take = |name: &str| values.remove(name).filter(|v| !v.is_empty());
    let build_id = take(BUILD_ID).and_then(BuildId::new);
    let project = take(PROJECT).and_then(ProjectId::new);
    let org = take(ORG).and_then(Organization::new);
    let repo = take(REPO).and_then(Repository::new);
    let context = take(CONTEXT);

    match (build_id, project, org, repo) {
        (Some(build_id), Some(project), Some(org), Some(repo)) => Ok(TriggerRequest {
            build: BuildRef::new(project, build_id),
            org,
            repo,
            context,
        }),
        (build_id, project, org, repo) => {
            let missing = [
                (BUILD_ID, build_id.is_none()),
                (PROJECT, project.is_none()),
                (ORG, org.is_none()),
                (REPO, repo.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            Err(TriggerError::MissingParameters(missing))
        }
    }
}

fn merge(values: &mut HashMap<String, String>, pairs: Vec<(String, String)>) {
    for (key, value) in pairs {
        values.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_parameters_from_query() {
        let req = parse(
            Some("buildID=b1&project=p&org=acme&repo=widgets&context=lint"),
            None,
        )
        .unwrap();
        assert_eq!(req.build.build_id.as_str(), "b1");
        assert_eq!(req.build.project.as_str(), "p");
        assert_eq!(req.org.as_str(), "acme");
        assert_eq!(req.repo.as_str(), "widgets");
        assert_eq!(req.context.as_deref(), Some("lint"));
    }

    #[test]
    fn body_values_take_precedence_over_query() {
        let req = parse(
            Some("buildID=from-query&project=p&org=acme&repo=widgets"),
            Some(b"buildID=from-body"),
        )
        .unwrap();
        assert_eq!(req.build.build_id.as_str(), "from-body");
    }

    #[test]
    fn missing_parameters_are_all_named() {
        let err = parse(Some("buildID=b1&org=&context=x"), None).unwrap_err();
        match err {
            TriggerError::MissingParameters(names) => {
                assert_eq!(names, vec![PROJECT, ORG, REPO]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_context_is_treated_as_absent() {
        let req = parse(Some("buildID=b&project=p&org=o&repo=r&context="), None).unwrap();
        assert_eq!(req.context, None);
    }

    #[test]
    fn percent_encoding_is_decoded() {
        let req = parse(Some("buildID=b&project=p&org=o&repo=r&context=fo%21o_1"), None).unwrap();
        assert_eq!(req.context.as_deref(), Some("fo!o_1"));
    }
}
