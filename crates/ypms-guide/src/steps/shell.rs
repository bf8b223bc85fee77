//! `shell` step (`spec.md` §4.4).
//!
//! `content` is a command string, a list of command strings (each run via
//! the system shell in order), or `{cmd, cwd?, env?, shell?, check?: bool=true}`.
//! `cmd` may itself be a string, a list of args, or a list of arg-lists (one
//! subprocess per inner list). When `cmd` is an arg-list, `shell` defaults to
//! `false` (args are exec'd directly); when `cmd` is a string, `shell`
//! defaults to `true`. The subprocess environment is the caller's plus the
//! substitution variables plus any user-supplied `env` overrides.

use std::path::Path;

use ypms_core::{Error, Result, SubstitutionContext};

#[cfg(unix)]
const SHELL: &str = "sh";
#[cfg(unix)]
const SHELL_ARG: &str = "-c";

#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_ARG: &str = "/C";

/// One concrete subprocess invocation derived from `content.cmd`.
enum Invocation {
    /// Run through the system shell with a single command line.
    ShellLine(String),
    /// Exec directly, no shell, argv[0] + args.
    Argv(Vec<String>),
}

fn invocations_from_cmd(cmd: &sonic_rs::Value, use_shell: Option<bool>) -> Result<(Vec<Invocation>, bool)> {
    if let Some(s) = cmd.as_str() {
        return Ok((vec![Invocation::ShellLine(s.to_string())], use_shell.unwrap_or(true)));
    }
    let arr = cmd
        .as_array()
        .ok_or_else(|| Error::validation("shell content.cmd must be a string or list"))?;

    // A list of strings is one argv; a list of lists is several argvs.
    if arr.iter().all(|v| v.as_str().is_some()) {
        let argv = arr
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        return Ok((vec![Invocation::Argv(argv)], use_shell.unwrap_or(false)));
    }

    let mut out = Vec::with_capacity(arr.len());
    for entry in arr.iter() {
        let sub = entry
            .as_array()
            .ok_or_else(|| Error::validation("shell content.cmd entries must all be lists or all be strings"))?;
        let argv = sub
            .iter()
            .map(|v| {
                v.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Error::validation("shell content.cmd arg-list entries must be strings"))
            })
            .collect::<Result<Vec<_>>>()?;
        out.push(Invocation::Argv(argv));
    }
    Ok((out, use_shell.unwrap_or(false)))
}

fn extra_env(content: &sonic_rs::Value) -> Vec<(String, String)> {
    let Some(obj) = content.get("env").and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    obj.iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.to_string(), s.to_string())))
        .collect()
}

pub async fn shell(
    content: &sonic_rs::Value,
    env_dir: &Path,
    ctx: &SubstitutionContext,
) -> Result<String> {
    // Bare string or list-of-strings shorthand: each entry is one shell line.
    if content.as_str().is_some() || content.as_array().is_some() {
        let lines = if let Some(s) = content.as_str() {
            vec![s.to_string()]
        } else {
            content
                .as_array()
                .unwrap()
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| Error::validation("shell list entries must be strings"))
                })
                .collect::<Result<Vec<_>>>()?
        };
        let mut last = 0i32;
        for raw in &lines {
            last = run_shell_line(&ctx.apply(raw), env_dir, ctx, &[], true).await?;
        }
        return Ok(format!("ran {} command(s), last exit {last}", lines.len()));
    }

    let cmd = content
        .get("cmd")
        .ok_or_else(|| Error::validation("shell object content needs `cmd`"))?;
    let explicit_shell = content.get("shell").and_then(|v| v.as_bool());
    let check = content.get("check").and_then(|v| v.as_bool()).unwrap_or(true);
    let cwd_rel = content.get("cwd").and_then(|v| v.as_str());
    let cwd = cwd_rel.map_or_else(|| env_dir.to_path_buf(), |c| env_dir.join(ctx.apply(c)));
    let user_env = extra_env(content);

    let (invocations, use_shell) = invocations_from_cmd(cmd, explicit_shell)?;
    let mut last_code = 0i32;

    for inv in invocations {
        last_code = match inv {
            Invocation::ShellLine(line) => {
                run_shell_line(&ctx.apply(&line), &cwd, ctx, &user_env, check).await?
            }
            Invocation::Argv(argv) => {
                let argv: Vec<String> = argv.iter().map(|a| ctx.apply(a)).collect();
                run_argv(&argv, &cwd, ctx, &user_env, use_shell, check).await?
            }
        };
    }

    Ok(format!("exit {last_code}"))
}

async fn run_shell_line(
    line: &str,
    cwd: &Path,
    ctx: &SubstitutionContext,
    user_env: &[(String, String)],
    check: bool,
) -> Result<i32> {
    let mut cmd = tokio::process::Command::new(SHELL);
    cmd.arg(SHELL_ARG).arg(line).current_dir(cwd);
    apply_env(&mut cmd, ctx, user_env);
    run(cmd, line, check).await
}

async fn run_argv(
    argv: &[String],
    cwd: &Path,
    ctx: &SubstitutionContext,
    user_env: &[(String, String)],
    use_shell: bool,
    check: bool,
) -> Result<i32> {
    let joined = argv.join(" ");
    let mut cmd = if use_shell {
        let mut c = tokio::process::Command::new(SHELL);
        c.arg(SHELL_ARG).arg(&joined);
        c
    } else {
        let mut c = tokio::process::Command::new(&argv[0]);
        c.args(&argv[1..]);
        c
    };
    cmd.current_dir(cwd);
    apply_env(&mut cmd, ctx, user_env);
    run(cmd, &joined, check).await
}

fn apply_env(cmd: &mut tokio::process::Command, ctx: &SubstitutionContext, user_env: &[(String, String)]) {
    for (key, value) in ctx.as_env_pairs() {
        cmd.env(key, value);
    }
    for (key, value) in user_env {
        cmd.env(key, value);
    }
}

async fn run(mut cmd: tokio::process::Command, label: &str, check: bool) -> Result<i32> {
    let status = cmd
        .status()
        .await
        .map_err(|e| Error::process(-1, format!("failed to spawn `{label}`: {e}")))?;
    let code = status.code().unwrap_or(-1);
    if check && !status.success() {
        return Err(Error::process(code, format!("command `{label}` exited non-zero")));
    }
    Ok(code)
}
