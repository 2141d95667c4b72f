//! Pure shim-script rendering (§4.9). `ShimPlan::render()` never touches the
//! filesystem; `write_to` is the thin I/O shell around it.

use std::path::Path;
use veto_core::Action;

/// The closed set of commands shimmed per action class.
pub fn commands_for(action: Action) -> &'static [&'static str] {
    match action {
        Action::Delete => &["rm", "unlink", "rmdir"],
        Action::Modify => &["mv", "cp", "touch", "chmod", "chown", "tee"],
        Action::Execute => &["node", "python", "python3", "bash", "sh", "npx", "pnpm", "npm", "yarn"],
        Action::Read => &["cat", "less", "head", "tail", "more"],
    }
}

/// One shim: the command name it replaces and the POSIX `sh` script body.
#[derive(Debug, Clone)]
pub struct ShimScript {
    pub name: String,
    pub body: String,
}

/// The full set of shims for one session: one script per command in every
/// action's closed set, plus the `git` special case.
#[derive(Debug, Clone, Default)]
pub struct ShimPlan {
    pub scripts: Vec<ShimScript>,
}

impl ShimPlan {
    /// Build the plan for the given actions (typically all four, but a
    /// caller materialising a single-action session may narrow this).
    pub fn render(actions: &[Action]) -> Self {
        let mut scripts = Vec::new();
        for &action in actions {
            for &name in commands_for(action) {
                if scripts.iter().any(|s: &ShimScript| s.name == name) {
                    continue;
                }
                scripts.push(ShimScript {
                    name: name.to_string(),
                    body: command_shim_body(name, action),
                });
            }
        }
        if actions.contains(&Action::Delete) || actions.contains(&Action::Modify) {
            scripts.push(ShimScript {
                name: "git".to_string(),
                body: crate::git::git_shim_body(),
            });
        }
        Self { scripts }
    }

    /// Write every script to `dir`, marked executable. The only I/O in this module.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        for script in &self.scripts {
            let path = dir.join(&script.name);
            std::fs::write(&path, &script.body)?;
            set_executable(&path)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Render one command's shim body — real-binary resolution (minus the shim
/// directory), non-flag-argument collection, per-target daemon checks, then
/// `exec` of the real binary. `veto shim-check` owns the directory-walk and
/// daemon-handshake logic so it lives in exactly one place, not duplicated
/// across every generated script.
fn command_shim_body(name: &str, action: Action) -> String {
    format!(
        r#"#!/bin/sh
# veto shim for {name} ({action})
real=""
oldifs="$IFS"
IFS=':'
for dir in $PATH; do
    if [ "$dir" = "$VETO_SHIM_DIR" ]; then
        continue
    fi
    if [ -x "$dir/{name}" ]; then
        real="$dir/{name}"
        break
    fi
done
IFS="$oldifs"

if [ -z "$real" ]; then
    echo "veto: no underlying '{name}' found on PATH" >&2
    exit 127
fi

targets=""
for arg in "$@"; do
    case "$arg" in
        -*) ;;
        *) targets="$targets $arg" ;;
    esac
done

if [ -n "$targets" ]; then
    if ! veto shim-check --action {action} --port "$VETO_PORT" $targets; then
        exit 1
    fi
fi

exec "$real" "$@"
"#,
        name = name,
        action = action,
    )
}
