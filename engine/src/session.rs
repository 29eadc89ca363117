use crate::config::Config;
use crate::directory::{self, MonsterEntry};
use crate::error::StatblockError;
use crate::fetch::Fetch;
use crate::ingest::{self, Statblock};
use crate::render::{self, Layout, RenderOptions};
use crate::storage::Storage;
use crate::store::{Provenance, StatblockStore};

pub const WELCOME_KEY: &str = "hasSeenWelcome";

/// Everything one user sees: the directory listing, the collection, the
/// layout and the error banner. Failures land in the banner or are returned
/// to the caller; cards already in the store are never lost to an error.
pub struct Session<S: Storage, F: Fetch> {
    config: Config,
    fetcher: F,
    store: StatblockStore<S>,
    monsters: Vec<MonsterEntry>,
    banner: Option<String>,
    layout: Layout,
}

impl<S: Storage, F: Fetch> Session<S, F> {
    pub fn open(config: Config, storage: S, fetcher: F) -> Result<Self, StatblockError> {
        let layout = config.layout;
        Ok(Self {
            config,
            fetcher,
            store: StatblockStore::open(storage)?,
            monsters: Vec::new(),
            banner: None,
            layout,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &StatblockStore<S> {
        &self.store
    }

    /// Reload the directory. On failure the listing is empty and the banner
    /// carries the message.
    pub fn refresh_directory(&mut self) -> &[MonsterEntry] {
        match directory::list_monsters(&self.fetcher, &self.config) {
            Ok(entries) => self.monsters = entries,
            Err(e) => {
                tracing::error!(error = %e, "fetching monster list");
                self.monsters.clear();
                self.banner = Some(e.to_string());
            }
        }
        &self.monsters
    }

    pub fn monsters(&self) -> &[MonsterEntry] {
        &self.monsters
    }

    pub fn search(&self, term: &str) -> Vec<&MonsterEntry> {
        directory::search(&self.monsters, term)
    }

    /// Fetch, parse and append a directory monster to the standard partition.
    pub fn select_monster(&mut self, url: &str) -> Result<usize, StatblockError> {
        self.banner = None;
        let added = ingest::fetch_statblock(&self.fetcher, url)
            .and_then(|statblock| self.store.append(Provenance::Standard, statblock));
        if let Err(e) = &added {
            tracing::error!(url, error = %e, "adding monster");
            self.banner = Some(e.to_string());
        }
        added
    }

    /// Parse pasted text (fence optional) into the custom partition.
    pub fn add_custom(&mut self, text: &str) -> Result<usize, StatblockError> {
        let statblock = ingest::ingest_custom(text)?;
        self.store.append(Provenance::Custom, statblock)
    }

    /// Text to prefill an edit with: the retained source of the card.
    pub fn edit_source(&self, index: usize) -> Option<&str> {
        self.store.get(index).map(|(_, sb)| sb.source())
    }

    pub fn edit(&mut self, index: usize, text: &str) -> Result<Statblock, StatblockError> {
        if index >= self.store.len() {
            return Err(StatblockError::IndexOutOfRange {
                index,
                len: self.store.len(),
            });
        }
        let statblock = ingest::apply_edit(text)?;
        self.store.replace_at(index, statblock)
    }

    pub fn remove(&mut self, index: usize) -> Result<Statblock, StatblockError> {
        self.store.remove_at(index)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn toggle_layout(&mut self) -> Layout {
        self.layout = self.layout.toggled();
        self.layout
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// True until [`Session::mark_welcome_seen`] has been stored once.
    pub fn needs_welcome(&self) -> bool {
        match self.store.storage().get(WELCOME_KEY) {
            Ok(Some(flag)) => flag.trim() != "true",
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, "reading welcome flag");
                true
            }
        }
    }

    pub fn mark_welcome_seen(&mut self) -> Result<(), StatblockError> {
        self.store.storage_mut().set(WELCOME_KEY, "true")
    }

    pub fn render_page(&self, controls: bool) -> String {
        let options = RenderOptions {
            layout: self.layout,
            controls,
            banner: self.banner.clone(),
            ..RenderOptions::default()
        };
        render::render_page(self.store.combined().map(|(_, sb)| sb.record()), &options)
    }
}
