//! CLI route: single route table and run context. Dispatches to the registry
//! and entity operations, then to presentation.

use crate::cli::parse::{BatchLine, Commands};
use crate::cli::presentation::{
    format_change, format_history_result, format_log_result, format_scan_result,
    format_tags_result, ScanRow,
};
use crate::config::ConfigLoader;
use crate::context::Context;
use crate::error::{ApiError, ModelError};
use crate::observer::{Listener, Observable, Reference};
use crate::registry::Registry;
use crate::tree::walker::ScanConfig;
use crate::types::EntityId;
use crate::views;
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime context for CLI execution: the model, its collaborators and the
/// roots to scan. Nothing is persisted between runs.
pub struct RunContext {
    ctx: Context,
    registry: Registry,
    roots: Vec<PathBuf>,
    scan_rows: Option<Vec<ScanRow>>,
    reference: Observable<Reference>,
}

impl RunContext {
    /// Create run context from the workspace, an optional config file and the
    /// `--root` arguments. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        roots: Vec<PathBuf>,
    ) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let roots = if !roots.is_empty() {
            roots
        } else if !config.library.roots.is_empty() {
            config
                .library
                .roots
                .iter()
                .map(|root| workspace_root.join(root))
                .collect()
        } else {
            vec![workspace_root]
        };

        Ok(Self::with_context(Context::filesystem(), config.library.scan, roots))
    }

    /// Run context over caller-supplied collaborators.
    pub fn with_context(ctx: Context, scan: ScanConfig, roots: Vec<PathBuf>) -> Self {
        Self {
            ctx,
            registry: Registry::with_scan_config(scan),
            roots,
            scan_rows: None,
            reference: Observable::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The folder and image the last command acted on.
    pub fn reference(&self) -> Reference {
        *self.reference.value()
    }

    pub fn register_reference_listener(&mut self, listener: Arc<dyn Listener<Reference>>) {
        self.reference.add_listener(listener);
    }

    /// Execute a CLI command via the single route table. The roots are
    /// scanned before the first command.
    pub fn execute(&mut self, command: &Commands) -> Result<String, ApiError> {
        self.ensure_scanned()?;
        match command {
            Commands::Batch { file } => self.run_batch(file.as_deref()),
            other => self.execute_inner(other),
        }
    }

    fn ensure_scanned(&mut self) -> Result<(), ApiError> {
        if self.scan_rows.is_some() {
            return Ok(());
        }
        let mut rows = Vec::new();
        for root in &self.roots {
            match self.registry.add_root(&self.ctx, root) {
                Ok((id, report)) => {
                    rows.push(ScanRow {
                        root: self.registry.tree().directory_path(id)?,
                        directories: report.directories,
                        images: report.images,
                        skipped: report.skipped,
                        absorbed_roots: report.absorbed_roots,
                    });
                }
                Err(ModelError::InvalidArgument(reason)) => {
                    warn!(root = %root.display(), reason, "Root skipped");
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.scan_rows = Some(rows);
        Ok(())
    }

    fn execute_inner(&mut self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Scan { format } => {
                format_scan_result(self.scan_rows.as_deref().unwrap_or_default(), format)
            }
            Commands::Tag { path, tags } => {
                let item = self.item_at(path)?;
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                self.registry.add_tags(&self.ctx, item, &tags)?;
                self.select(EntityId::Item(item))?;
                Ok(format_change("Tagged", &self.registry.tree().item_path(item)?))
            }
            Commands::Untag { path, tags } => {
                let item = self.item_at(path)?;
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                self.registry.tree_mut().remove_tags(&self.ctx, item, &tags)?;
                self.select(EntityId::Item(item))?;
                Ok(format_change("Untagged", &self.registry.tree().item_path(item)?))
            }
            Commands::Rename { path, name } => {
                let entity = self.entity_at(path)?;
                match entity {
                    EntityId::Item(id) => self.registry.rename_item(&self.ctx, id, name)?,
                    EntityId::Directory(id) => {
                        self.registry.tree_mut().rename_directory(&self.ctx, id, name)?
                    }
                }
                self.select(entity)?;
                Ok(format_change("Renamed", &self.registry.tree().path_of(entity)?))
            }
            Commands::Move { path, dir } => {
                let entity = self.entity_at(path)?;
                let target = self.dir_at(dir)?;
                match entity {
                    EntityId::Item(id) => self.registry.tree_mut().move_item(&self.ctx, id, target)?,
                    EntityId::Directory(id) => {
                        self.registry.tree_mut().move_directory(&self.ctx, id, target)?
                    }
                }
                self.select(entity)?;
                Ok(format_change("Moved", &self.registry.tree().path_of(entity)?))
            }
            Commands::Mkdir { parent, name } => {
                let parent = self.dir_at(parent)?;
                let id = self
                    .registry
                    .tree_mut()
                    .create_subdirectory(&self.ctx, parent, name)?;
                self.select(EntityId::Directory(id))?;
                Ok(format_change("Created", &self.registry.tree().directory_path(id)?))
            }
            Commands::Tags { format } => format_tags_result(&self.registry.tags(), format),
            Commands::History { path, format } => {
                let tree = self.registry.tree();
                let entries = match self.entity_at(path)? {
                    EntityId::Item(id) => views::item_history(tree.item(id)?.history()),
                    EntityId::Directory(id) => views::directory_history(tree.directory(id)?.history()),
                };
                format_history_result(&entries, format)
            }
            Commands::Revert { path, rank } => {
                let entity = self.entity_at(path)?;
                let missing = || ModelError::NotFound(format!("no snapshot at rank {} for {}", rank, path.display()));
                match entity {
                    EntityId::Item(id) => {
                        let snap = self.registry.tree().item(id)?.history().snap(*rank).ok_or_else(missing)?;
                        self.registry.tree_mut().revert_item(&self.ctx, id, &snap)?;
                    }
                    EntityId::Directory(id) => {
                        let snap = self
                            .registry
                            .tree()
                            .directory(id)?
                            .history()
                            .snap(*rank)
                            .ok_or_else(missing)?;
                        self.registry.tree_mut().revert_directory(&self.ctx, id, &snap)?;
                    }
                }
                self.select(entity)?;
                Ok(format_change("Reverted", &self.registry.tree().path_of(entity)?))
            }
            Commands::Log => Ok(format_log_result(&self.ctx.audit_log().render())),
            Commands::Batch { .. } => Err(ApiError::ConfigError(
                "batch files cannot run other batch files".to_string(),
            )),
        }
    }

    /// Run each non-empty, non-comment line as a command. Stops at the first failure.
    fn run_batch(&mut self, file: Option<&Path>) -> Result<String, ApiError> {
        let script = match file {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| ApiError::Model(ModelError::io(path, e)))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| ApiError::Model(ModelError::io("<stdin>", e)))?;
                buf
            }
        };

        let mut outputs = Vec::new();
        for (index, line) in script.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let words = split_words(trimmed).map_err(|message| ApiError::InvalidCommand {
                line: line_no,
                message,
            })?;
            let parsed = BatchLine::try_parse_from(words).map_err(|e| ApiError::InvalidCommand {
                line: line_no,
                message: e.to_string(),
            })?;
            let output = self.execute_inner(&parsed.command)?;
            info!(line = line_no, "Batch command done");
            outputs.push(output);
        }
        Ok(outputs.join("\n"))
    }

    fn entity_at(&self, path: &Path) -> Result<EntityId, ApiError> {
        self.registry
            .resolve(&self.ctx, path)
            .map_err(|e| match e {
                ModelError::NotFound(_) => ApiError::PathNotTracked(path.to_path_buf()),
                other => other.into(),
            })
    }

    fn item_at(&self, path: &Path) -> Result<crate::types::ItemId, ApiError> {
        match self.entity_at(path)? {
            EntityId::Item(id) => Ok(id),
            EntityId::Directory(_) => Err(ModelError::NotAnImage(path.to_path_buf()).into()),
        }
    }

    fn dir_at(&self, path: &Path) -> Result<crate::types::DirectoryId, ApiError> {
        match self.entity_at(path)? {
            EntityId::Directory(id) => Ok(id),
            EntityId::Item(_) => Err(ModelError::NotADirectory(path.to_path_buf()).into()),
        }
    }

    fn select(&mut self, entity: EntityId) -> Result<(), ApiError> {
        let tree = self.registry.tree();
        let reference = match entity {
            EntityId::Item(id) => Reference::item(tree.item(id)?.directory(), id),
            EntityId::Directory(id) => Reference::directory(id),
        };
        self.reference.update(reference);
        Ok(())
    }
}

/// Split a batch line into words. Double quotes group words containing spaces.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
