//! `add-repo` / `remove-repo` steps (`spec.md` §4.4).
//!
//! `add-repo` content is `{name, url}`, a list of same, a mapping
//! `name -> url`, or the string `"NAME URL"`. `remove-repo` content is a
//! name, a list of names, or `{name|names}`.

use ypms_core::{Error, Result, SubstitutionContext};

use crate::effects::Effects;

fn name_url_pairs(content: &sonic_rs::Value) -> Result<Vec<(String, String)>> {
    if let Some(s) = content.as_str() {
        let mut parts = s.splitn(2, ' ');
        let name = parts.next().unwrap_or_default().trim();
        let url = parts.next().unwrap_or_default().trim();
        if name.is_empty() || url.is_empty() {
            return Err(Error::validation(format!(
                "add-repo string content must be `NAME URL`, got `{s}`"
            )));
        }
        return Ok(vec![(name.to_string(), url.to_string())]);
    }

    if let Some(arr) = content.as_array() {
        return arr.iter().map(pair_from_object).collect();
    }

    if content.is_object() {
        if content.get("name").is_some() && content.get("url").is_some() {
            return Ok(vec![pair_from_object(content)?]);
        }
        // Otherwise treat as a `name -> url` mapping.
        let obj = content
            .as_object()
            .ok_or_else(|| Error::validation("add-repo object content is malformed"))?;
        return obj
            .iter()
            .map(|(name, url)| {
                let url = url
                    .as_str()
                    .ok_or_else(|| Error::validation(format!("add-repo mapping value for {name} must be a string")))?;
                Ok((name.to_string(), url.to_string()))
            })
            .collect();
    }

    Err(Error::validation(
        "add-repo content must be a string, object, list, or mapping",
    ))
}

fn pair_from_object(entry: &sonic_rs::Value) -> Result<(String, String)> {
    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::validation("add-repo entry needs `name`"))?;
    let url = entry
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::validation("add-repo entry needs `url`"))?;
    Ok((name.to_string(), url.to_string()))
}

pub async fn add_repo(
    content: &sonic_rs::Value,
    ctx: &SubstitutionContext,
    effects: &mut dyn Effects,
) -> Result<String> {
    let mut added = Vec::new();
    for (name, url) in name_url_pairs(content)? {
        let name = ctx.apply(&name);
        let url = ctx.apply(&url);
        if effects.has_repo(&name).await? {
            continue;
        }
        effects.add_repo(&name, &url).await?;
        added.push(name);
    }
    Ok(format!("added [{}]", added.join(", ")))
}

fn names_from(content: &sonic_rs::Value) -> Result<Vec<String>> {
    if let Some(s) = content.as_str() {
        return Ok(vec![s.to_string()]);
    }
    if let Some(arr) = content.as_array() {
        return arr
            .iter()
            .map(|v| {
                v.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Error::validation("remove-repo list entries must be strings"))
            })
            .collect();
    }
    if content.is_object() {
        if let Some(single) = content.get("name").and_then(|v| v.as_str()) {
            return Ok(vec![single.to_string()]);
        }
        if let Some(arr) = content.get("names").and_then(|v| v.as_array()) {
            return arr
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| Error::validation("remove-repo names entries must be strings"))
                })
                .collect();
        }
        return Err(Error::validation(
            "remove-repo object content needs `name` or `names`",
        ));
    }
    Err(Error::validation(
        "remove-repo content must be a string, list, or object",
    ))
}

pub async fn remove_repo(
    content: &sonic_rs::Value,
    ctx: &SubstitutionContext,
    effects: &mut dyn Effects,
) -> Result<String> {
    let mut removed = Vec::new();
    for name in names_from(content)? {
        let name = ctx.apply(&name);
        effects.remove_repo(&name).await?;
        removed.push(name);
    }
    Ok(format!("removed [{}]", removed.join(", ")))
}

/// The repo name(s) an `add-repo` step's content would register, without
/// running any substitution or side effects. Used by the planner to predict
/// sources a pending install will provide.
pub fn predicted_names(content: &sonic_rs::Value) -> Vec<String> {
    name_url_pairs(content)
        .map(|pairs| pairs.into_iter().map(|(name, _)| name).collect())
        .unwrap_or_default()
}
