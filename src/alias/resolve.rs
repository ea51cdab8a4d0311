//! Building aliases from paths on disk.

use std::fs::{self, Metadata};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::consts::{FS_TYPE_HFS_PLUS, ROOT_VOLUME_NAME, VOLUMES_DIR};
use super::record::{Alias, DiskType, TargetInfo, TargetKind, VolumeInfo};
use super::{AliasError, Result};
use crate::common::time::{to_hfs_high_res, to_hfs_seconds};

impl Alias {
    /// Build an alias for an existing file or folder.
    ///
    /// The volume is taken from the `/Volumes/<name>` prefix of the
    /// canonical path; anything else is treated as living on the boot
    /// volume.
    pub fn for_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let resolve = |source| AliasError::Resolve {
            path: path.to_path_buf(),
            source,
        };

        let target = fs::canonicalize(path).map_err(resolve)?;
        let meta = fs::metadata(&target).map_err(resolve)?;
        let mount = mount_point(&target);
        let volume_meta = fs::metadata(&mount).map_err(resolve)?;

        let volume_name = volume_name(&mount);
        let disk_type = if mount == Path::new("/") {
            DiskType::Fixed
        } else {
            DiskType::Ejectable
        };

        let filename = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| volume_name.clone());
        let parent = target.parent().unwrap_or(mount.as_path()).to_path_buf();
        let parent_meta = fs::metadata(&parent).map_err(resolve)?;
        let folder_name = if parent == mount {
            volume_name.clone()
        } else {
            parent
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| volume_name.clone())
        };

        let relative: Vec<String> = target
            .strip_prefix(&mount)
            .map(|rel| {
                rel.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut cnid_path = Vec::new();
        for dir in parent.ancestors() {
            if dir == mount || !dir.starts_with(&mount) {
                break;
            }
            cnid_path.push(cnid(&fs::metadata(dir).map_err(resolve)?));
        }

        let carbon_path = std::iter::once(volume_name.clone())
            .chain(relative.iter().map(|part| part.replace(':', "/")))
            .collect::<Vec<_>>()
            .join(":");
        let posix_path = format!("/{}", relative.join("/"));

        let volume_created = created(&volume_meta);
        let target_created = created(&meta);

        tracing::debug!(
            path = %target.display(),
            volume = %volume_name,
            "resolved alias target"
        );

        Ok(Alias {
            app_info: [0; 4],
            volume: VolumeInfo {
                name: volume_name,
                creation_date: to_hfs_seconds(volume_created),
                high_res_creation_date: Some(to_hfs_high_res(volume_created)),
                fs_type: FS_TYPE_HFS_PLUS,
                disk_type,
                attribute_flags: 0,
                fs_id: [0; 2],
                posix_mount_point: Some(mount.to_string_lossy().into_owned()),
            },
            target: TargetInfo {
                kind: if meta.is_dir() {
                    TargetKind::Folder
                } else {
                    TargetKind::File
                },
                filename,
                folder_cnid: cnid(&parent_meta),
                cnid: cnid(&meta),
                creation_date: to_hfs_seconds(target_created),
                high_res_creation_date: Some(to_hfs_high_res(target_created)),
                creator_code: [0; 4],
                type_code: [0; 4],
                levels_from: -1,
                levels_to: -1,
                folder_name: Some(folder_name),
                cnid_path,
                carbon_path: Some(carbon_path),
                posix_path: Some(posix_path),
            },
        })
    }
}

/// Mount point of the volume holding `path`.
pub(crate) fn mount_point(path: &Path) -> PathBuf {
    let mut components = path.components();
    if let (Some(Component::RootDir), Some(Component::Normal(dir)), Some(Component::Normal(name))) =
        (components.next(), components.next(), components.next())
        && dir == VOLUMES_DIR
    {
        return Path::new("/").join(VOLUMES_DIR).join(name);
    }
    PathBuf::from("/")
}

fn volume_name(mount: &Path) -> String {
    match mount.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => ROOT_VOLUME_NAME.to_string(),
    }
}

fn created(meta: &Metadata) -> SystemTime {
    meta.created()
        .or_else(|_| meta.modified())
        .unwrap_or(UNIX_EPOCH)
}

#[cfg(unix)]
fn cnid(meta: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.ino() as u32
}

#[cfg(not(unix))]
fn cnid(_meta: &Metadata) -> u32 {
    0
}
