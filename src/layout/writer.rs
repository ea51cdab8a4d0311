use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::config::LayoutConfig;
use super::view_options::icon_view_plist;
use crate::alias::Alias;
use crate::common::Result;
use crate::dsstore::consts::*;
use crate::dsstore::{
    DsStore, DsStoreError, FourCC, IconLocation, OpenMode, RecordValue, plist_to_blob,
    with_store,
};

/// Outcome of [`write_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSummary {
    pub store_path: PathBuf,
    /// Records set during this run
    pub records_written: usize,
    /// Records in the store after the run, including ones that were already
    /// there
    pub total_records: usize,
}

/// Write the window layout described by `config` into its store file.
///
/// The store is opened read/write and always closed, so records set before
/// a failure are still committed. Records already in the store are kept
/// unless this run overwrites them.
pub fn write_layout(config: &LayoutConfig) -> Result<LayoutSummary> {
    config.validate()?;
    let store_path = config.store_path();
    info!(path = %store_path.display(), "writing window layout");

    let mut records_written = 0;
    let total_records = with_store(&store_path, OpenMode::ReadWrite, |store| {
        apply_layout(store, config, &mut records_written)?;
        Ok::<_, crate::common::Error>(store.len())
    })
    .inspect_err(|err| {
        warn!(
            path = %store_path.display(),
            records_written,
            error = %err,
            "window layout incomplete"
        );
    })?;

    info!(
        path = %store_path.display(),
        records_written,
        total_records,
        "window layout written"
    );
    Ok(LayoutSummary {
        store_path,
        records_written,
        total_records,
    })
}

/// Set every layout record, counting each one into `written` once it is stored.
fn apply_layout(store: &mut DsStore, config: &LayoutConfig, written: &mut usize) -> Result<()> {
    let mut set = |store: &mut DsStore, name: &str, code: FourCC, value: RecordValue| {
        store.set(name, code, value)?;
        *written += 1;
        Ok::<_, DsStoreError>(())
    };

    set(
        store,
        ROOT_ENTRY,
        CODE_WINDOW_INFO,
        config.window.to_window_info().into(),
    )?;

    for icon in &config.icons {
        debug!(entry = %icon.name, x = icon.x, y = icon.y, "placing icon");
        set(
            store,
            &icon.name,
            CODE_ICON_LOCATION,
            IconLocation::new(icon.x, icon.y).into(),
        )?;
    }

    let alias = Alias::for_file(config.background_path())?.to_bytes()?;
    let plist = icon_view_plist(&config.view, alias);
    set(
        store,
        ROOT_ENTRY,
        CODE_ICON_VIEW_PLIST,
        RecordValue::Blob(plist_to_blob(&plist)?),
    )?;

    set(store, ROOT_ENTRY, CODE_SIDEBAR_WIDTH, config.sidebar_width.into())?;
    set(store, ROOT_ENTRY, CODE_WINDOW_HEIGHT, config.window_height.into())?;
    set(store, ROOT_ENTRY, CODE_ICON_VIEW_FLAG, config.icon_view_flag.into())?;
    set(store, ROOT_ENTRY, CODE_ICON_TEXT_SIZE, config.label_text_size.into())?;

    Ok(())
}
