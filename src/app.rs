//! Application orchestrator.
//! Loads/merges config, initializes logging, builds the platform context and
//! runs one facade operation on a tokio runtime.
//!
//! Exit status: 0 when the operation happened, 1 for a negative result, the
//! error's code for an invalid argument or an unusable platform context.

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use portable_fs::cli::{Args, Command};
use portable_fs::config::xml::write_template_config;
use portable_fs::output as out;
use portable_fs::{
    AccessMode, CONFIG_ENV_VAR, Config, FileSystem, FsError, default_config_path, load_config,
    load_config_from_xml_path,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<ExitCode> {
    let cfg_path = match &args.config {
        Some(p) => p.clone(),
        None => default_config_path()?,
    };

    // Handle --print-config / --init-config before logging init
    if args.print_config {
        if args.config.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_some() {
            out::print_info(&format!("Using {CONFIG_ENV_VAR} (explicit):\n  {}", cfg_path.display()));
        } else {
            out::print_info(&format!("portable_fs config path:\n  {}", cfg_path.display()));
        }
        if !cfg_path.exists() {
            out::print_info("No config file exists there yet. Run with --init-config to create a template.");
        }
        return Ok(ExitCode::SUCCESS);
    }
    if args.init_config {
        write_template_config(&cfg_path)?;
        out::print_success(&format!("A template config was written to: {}", cfg_path.display()));
        return Ok(ExitCode::SUCCESS);
    }

    // Build config (may read XML). CLI args override config values.
    let mut cfg = match &args.config {
        Some(p) => load_config_from_xml_path(p)?,
        None => load_config()?,
    };
    args.apply_overrides(&mut cfg);

    let _guard = init_tracing(cfg.log_level, cfg.log_file(), args.json).inspect_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
    })?;
    debug!(?cfg, "configuration resolved");

    let Some(command) = args.command.clone() else {
        return Err(anyhow!("no command given; run with --help for usage"));
    };

    let ctx = match cfg.platform() {
        Ok(ctx) => ctx,
        Err(e) => {
            out::print_error(&e.to_string());
            return Ok(exit_code_for(&e));
        }
    };
    let fs = FileSystem::new(ctx);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    let code = match runtime.block_on(execute(&fs, &cfg, command)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            out::print_error(&e.to_string());
            exit_code_for(&e)
        }
    };
    Ok(code)
}

fn exit_code_for(e: &FsError) -> ExitCode {
    ExitCode::from(u8::try_from(e.code()).unwrap_or(1))
}

/// Report a facade flag. Returns it so callers can map it to an exit status.
fn report(done: bool, op: &str, target: &Path) -> bool {
    if done {
        info!(op, path = %target.display(), "completed");
        out::print_success(&format!("{op} '{}'", target.display()));
    } else {
        out::print_not_done(op, &target.display().to_string());
    }
    done
}

/// Report an I/O failure on an opened stream as a negative `open` result.
fn stream_failed(e: FsError, target: &str) -> bool {
    debug!(code = e.code(), error = %e, "open stream failed");
    out::print_error(&e.to_string());
    out::print_not_done("open", target);
    false
}

/// Run one command. `Ok(false)` is a negative result that has already been reported.
async fn execute(fs: &FileSystem, cfg: &Config, command: Command) -> Result<bool, FsError> {
    match command {
        Command::Stat { path } => {
            let detail = fs.get_detail(&path).await?;
            if !detail.exists() {
                out::print_not_done("stat", &path.display().to_string());
                return Ok(false);
            }
            out::print_user(&format!("path:      {}", detail.path()));
            out::print_user(&format!("name:      {}", detail.full_name()));
            out::print_user(&format!("size:      {}", detail.size()));
            let stamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
                t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".into())
            };
            out::print_user(&format!("created:   {}", stamp(detail.created_utc())));
            out::print_user(&format!("modified:  {}", stamp(detail.modified_utc())));
            Ok(true)
        }
        Command::Exists { path } => {
            let found = fs.exists(&path).await?;
            out::print_user(&found.to_string());
            Ok(found)
        }
        Command::Open { path, mode, collision, write } => {
            let method = collision.unwrap_or(cfg.default_collision);
            let mut stream = match fs.try_open_file(&path, mode, method).await {
                Ok(s) => s,
                Err(e) if e.is_invalid_argument() => return Err(e),
                Err(e) => {
                    debug!(code = e.code(), error = %e, "open failed");
                    out::print_error(&e.to_string());
                    out::print_not_done("open", &path.display().to_string());
                    return Ok(false);
                }
            };
            let opened = stream.path().clone();
            if let Some(text) = write {
                if mode == AccessMode::ReadOnly {
                    out::print_warn("--write ignored for a read-only open");
                } else if let Err(e) = stream.write_all(text.as_bytes()).await {
                    return Ok(stream_failed(FsError::io("write", opened.as_path())(e), &opened.to_string()));
                }
            }
            if let Err(e) = stream.close().await {
                return Ok(stream_failed(FsError::io("close", opened.as_path())(e), &opened.to_string()));
            }
            info!(path = %opened, %mode, %method, "opened");
            out::print_user(&opened.to_string());
            Ok(true)
        }
        Command::Rm { path } => Ok(report(fs.delete_file(&path).await?, "rm", &path)),
        Command::Mkdir { path, allow_existing } => {
            Ok(report(fs.create_directory(&path, allow_existing).await?, "mkdir", &path))
        }
        Command::Rmdir { path, recursive } => {
            Ok(report(fs.delete_directory(&path, recursive).await?, "rmdir", &path))
        }
        Command::Ls { path, recursive, dirs } => {
            let listed = if dirs {
                fs.list_directories(&path, recursive)
                    .await?
                    .map(|v| v.into_iter().map(|d| d.to_string()).collect::<Vec<_>>())
            } else {
                fs.list_files(&path, recursive)
                    .await?
                    .map(|v| v.into_iter().map(|f| f.path().to_string()).collect::<Vec<_>>())
            };
            match listed {
                Some(lines) => {
                    lines.iter().for_each(|l| out::print_user(l));
                    Ok(true)
                }
                None => {
                    out::print_not_done("ls", &path.display().to_string());
                    Ok(false)
                }
            }
        }
        Command::Mv { old, new } => {
            let done = fs.rename_file(&old, &new).await?;
            if done {
                info!(src = %old.display(), dest = %new.display(), "renamed");
                out::print_success(&format!("'{}' -> '{}'", old.display(), new.display()));
            } else {
                out::print_not_done("mv", &old.display().to_string());
            }
            Ok(done)
        }
        Command::Temp { create, ext } => match fs.get_temporary_path(create, &ext).await? {
            Some(p) => {
                out::print_user(&p.to_string());
                Ok(true)
            }
            None => {
                out::print_not_done("temp", &fs.context().temp_root().display().to_string());
                Ok(false)
            }
        },
    }
}
