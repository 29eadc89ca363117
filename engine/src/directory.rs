use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::StatblockError;
use crate::fetch::Fetch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Listing>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    objects: Option<Vec<serde_json::Value>>,
}

/// Fetch the directory and derive one entry per monster URL.
///
/// A well-formed envelope without `result.objects` is an empty directory, not
/// an error. Objects that are not `/monster/<slug>/` URLs are skipped.
pub fn list_monsters(
    fetcher: &impl Fetch,
    config: &Config,
) -> Result<Vec<MonsterEntry>, StatblockError> {
    let url = config.directory_url();
    let body = fetcher
        .get_text(&url)
        .map_err(|e| StatblockError::DirectoryFetchFailed(format!("{:#}", e)))?;
    let envelope: Envelope = serde_json::from_str(&body)
        .map_err(|e| StatblockError::DirectoryFetchFailed(format!("unexpected response: {}", e)))?;

    let Some(objects) = envelope.result.and_then(|r| r.objects) else {
        tracing::warn!(%url, "directory response has no result.objects");
        return Ok(Vec::new());
    };

    let entries: Vec<MonsterEntry> = objects
        .iter()
        .filter_map(|obj| {
            let Some(raw) = obj.as_str() else {
                tracing::debug!(?obj, "skipping non-string directory object");
                return None;
            };
            let Some(slug) = slug_from_url(raw) else {
                tracing::debug!(raw, "skipping directory object without monster slug");
                return None;
            };
            Some(MonsterEntry {
                name: display_name(slug, config.restore_umlauts),
                url: config.content_url(slug),
            })
        })
        .collect();
    tracing::info!(count = entries.len(), "loaded monster directory");
    Ok(entries)
}

/// `https://host/.../monster/adult-red-dragon/` → `adult-red-dragon`.
pub fn slug_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/monster/")?;
    let slug = rest.split('/').next()?;
    (!slug.is_empty()).then_some(slug)
}

/// Title-case the hyphen-separated segments of a slug, optionally restoring
/// umlaut digraphs first (`ae` → `ä`, `oe` → `ö`, `ue` → `ü`).
pub fn display_name(slug: &str, restore_umlauts: bool) -> String {
    slug.split('-')
        .map(|segment| {
            if restore_umlauts {
                capitalize(&restore_umlaut_digraphs(segment))
            } else {
                capitalize(segment)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `ae`/`oe`/`ue` (and capitalised forms) with umlauts. A `u`
/// closing `eu`/`au` or following `q` is left alone (`Feuer`, `Quelle`);
/// other genuine vowel pairs such as `Poet` are still rewritten.
pub fn restore_umlaut_digraphs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let before = i.checked_sub(1).map(|p| chars[p].to_ascii_lowercase());
        let digraph = chars.get(i + 1) == Some(&'e') && !closes_diphthong(c, before);
        match umlaut_for(c) {
            Some(umlaut) if digraph => {
                out.push(umlaut);
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn umlaut_for(c: char) -> Option<char> {
    match c {
        'a' => Some('ä'),
        'o' => Some('ö'),
        'u' => Some('ü'),
        'A' => Some('Ä'),
        'O' => Some('Ö'),
        'U' => Some('Ü'),
        _ => None,
    }
}

fn closes_diphthong(c: char, before: Option<char>) -> bool {
    matches!((c.to_ascii_lowercase(), before), ('u', Some('e' | 'a' | 'q')))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Case-insensitive substring filter over display names, directory order kept.
pub fn search<'a>(entries: &'a [MonsterEntry], term: &str) -> Vec<&'a MonsterEntry> {
    let needle = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|m| m.name.to_lowercase().contains(&needle))
        .collect()
}
