//! The `git` shim special case (§4.9): `git rm`/`git clean` resolve their
//! candidate targets and route through `veto shim-check` like any other
//! command; `git checkout .`/`git checkout -- .` and `git reset --hard` are
//! denied unconditionally — there's no useful candidate-target list for a
//! whole-tree discard, and a regex-level block is simpler and safer than
//! trying to enumerate every file `git` would touch. Every other subcommand
//! passes straight through to the real `git`.

pub fn git_shim_body() -> String {
    r#"#!/bin/sh
# veto shim for git (delete/modify subcommand interception)
real=""
oldifs="$IFS"
IFS=':'
for dir in $PATH; do
    if [ "$dir" = "$VETO_SHIM_DIR" ]; then
        continue
    fi
    if [ -x "$dir/git" ]; then
        real="$dir/git"
        break
    fi
done
IFS="$oldifs"

if [ -z "$real" ]; then
    echo "veto: no underlying 'git' found on PATH" >&2
    exit 127
fi

sub="$1"
shift 2>/dev/null || true

case "$sub" in
    reset)
        for arg in "$@"; do
            if [ "$arg" = "--hard" ]; then
                echo "veto: 'git reset --hard' is blocked — it discards uncommitted work" >&2
                exit 1
            fi
        done
        ;;
    checkout)
        for arg in "$@"; do
            if [ "$arg" = "." ]; then
                echo "veto: 'git checkout .' is blocked — use 'git checkout -- <file>' for a specific path" >&2
                exit 1
            fi
        done
        ;;
    clean)
        flags=""
        for arg in "$@"; do
            case "$arg" in
                -*f*|-*d*|-*x*) flags="1" ;;
            esac
        done
        if [ -n "$flags" ]; then
            candidates=$("$real" clean -nd "$@" 2>/dev/null | sed 's/^Would remove //')
            if [ -n "$candidates" ]; then
                if ! veto shim-check --action delete --port "$VETO_PORT" $candidates; then
                    exit 1
                fi
            fi
        fi
        ;;
    rm)
        targets=""
        for arg in "$@"; do
            case "$arg" in
                -*) ;;
                *) targets="$targets $arg" ;;
            esac
        done
        if [ -n "$targets" ]; then
            if ! veto shim-check --action delete --port "$VETO_PORT" $targets; then
                exit 1
            fi
        fi
        ;;
esac

exec "$real" "$sub" "$@"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_reset_hard_and_checkout_dot_unconditionally() {
        let body = git_shim_body();
        assert!(body.contains("git reset --hard"));
        assert!(body.contains("git checkout ."));
    }

    #[test]
    fn rm_and_clean_route_through_shim_check() {
        let body = git_shim_body();
        assert!(body.contains("veto shim-check --action delete"));
        assert!(body.contains("clean -nd"));
    }
}
