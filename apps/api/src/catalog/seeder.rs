//! Catalog Seeder — fills an empty card store from the artwork directory, once.
//!
//! Files are processed in filename order so ids are stable across runs.
//! Files whose names cannot be decoded are skipped with a warning.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::catalog::naming::card_display_name;
use crate::catalog::store::CardStore;
use crate::models::card::NewCard;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    DirectoryMissing,
    AlreadySeeded,
    Seeded { inserted: u64, skipped: usize },
}

/// Runs the seed pass and swallows any failure after logging it.
/// Startup continues with whatever catalog state resulted.
pub async fn run_seed(store: &dyn CardStore, cards_dir: &Path, public_path: &str) {
    match seed_catalog(store, cards_dir, public_path).await {
        Ok(SeedOutcome::DirectoryMissing) => {
            warn!("Card directory {} not found; catalog not seeded", cards_dir.display());
        }
        Ok(SeedOutcome::AlreadySeeded) => info!("Card catalog already seeded"),
        Ok(SeedOutcome::Seeded { inserted, skipped }) => {
            info!("Seeded {inserted} cards ({skipped} files skipped)");
        }
        Err(e) => error!("Card catalog seed failed: {e:?}"),
    }
}

pub async fn seed_catalog(
    store: &dyn CardStore,
    cards_dir: &Path,
    public_path: &str,
) -> Result<SeedOutcome> {
    if !tokio::fs::try_exists(cards_dir).await.unwrap_or(false) {
        return Ok(SeedOutcome::DirectoryMissing);
    }
    if !store.is_empty().await? {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let file_names = list_image_files(cards_dir).await?;
    let prefix = public_path.trim_end_matches('/');

    let mut cards = Vec::with_capacity(file_names.len());
    let mut skipped = 0;
    for file_name in file_names {
        let stem = Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name.as_str());
        match card_display_name(stem) {
            Ok(name) => cards.push(NewCard {
                name,
                image_path: format!("{prefix}/{file_name}"),
            }),
            Err(e) => {
                warn!("Skipping {file_name}: {e}");
                skipped += 1;
            }
        }
    }

    let inserted = if cards.is_empty() {
        0
    } else {
        store.insert_batch(&cards).await?
    };

    Ok(SeedOutcome::Seeded { inserted, skipped })
}

/// Image file names directly inside `dir`, sorted lexicographically.
async fn list_image_files(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read card directory {}", dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if has_image_extension(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn has_image_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
