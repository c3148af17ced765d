//! Purpose: Hold top-level CLI command dispatch for `lockstep`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay stable.
//! Invariants: Helpers in `main.rs` remain the source of emission logic.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "lockstep", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Check {
            dir,
            ext,
            keep_going,
            json,
        } => {
            init_tracing();
            let config = SweepConfig {
                dir: dir.clone(),
                extension: ext,
                policy: if keep_going {
                    SweepPolicy::KeepGoing
                } else {
                    SweepPolicy::FailFast
                },
            };
            let report = run_sweep(&config).map_err(add_missing_dir_hint)?;

            if json {
                emit_json(sweep_report_json(&report, &dir), color_mode);
            } else {
                emit_check_human(&report);
            }

            let exit_code = if report.clean() {
                0
            } else {
                to_exit_code(ErrorKind::Mismatch)
            };
            Ok(RunOutcome::with_code(exit_code))
        }
        Command::Diff { left, right, json } => {
            let left_tree = load_tree(&left)?;
            let right_tree = load_tree(&right)?;

            let forward = compare(&left_tree, &right_tree);
            let reverse = match &forward {
                Outcome::Match { .. } => Some(compare(&right_tree, &left_tree)),
                Outcome::Divergence(_) => None,
            };
            let equivalent = forward.divergence().is_none()
                && reverse
                    .as_ref()
                    .is_some_and(|outcome| outcome.divergence().is_none());

            if json {
                emit_json(
                    json!({
                        "left": left.display().to_string(),
                        "right": right.display().to_string(),
                        "forward": outcome_json(&forward),
                        "reverse": reverse.as_ref().map(outcome_json),
                        "equivalent": equivalent,
                    }),
                    color_mode,
                );
            } else if let Some(divergence) = forward.divergence() {
                println!("{} [left->right]", divergence_detail(divergence));
            } else if let Some(divergence) =
                reverse.as_ref().and_then(|outcome| outcome.divergence())
            {
                println!("{} [right->left]", divergence_detail(divergence));
            } else {
                let reverse_leaves = reverse.as_ref().map(Outcome::leaves).unwrap_or(0);
                println!(
                    "equivalent ({} leaves left->right, {} right->left)",
                    forward.leaves(),
                    reverse_leaves
                );
            }

            let exit_code = if equivalent {
                0
            } else {
                to_exit_code(ErrorKind::Mismatch)
            };
            Ok(RunOutcome::with_code(exit_code))
        }
        Command::Leaves { file, json } => {
            let tree = load_tree(&file)?;
            let records = collect_leaves(&tree);

            if json {
                let leaves = records
                    .iter()
                    .map(|record| {
                        json!({
                            "path": format_path(&record.path),
                            "value": record.value.to_json(),
                            "depth": record.depth,
                        })
                    })
                    .collect::<Vec<_>>();
                emit_json(
                    json!({
                        "file": file.display().to_string(),
                        "count": records.len(),
                        "leaves": leaves,
                    }),
                    color_mode,
                );
            } else {
                for record in &records {
                    println!("{} = {}", format_path(&record.path), record.value);
                }
                println!("{} leaves", records.len());
            }
            Ok(RunOutcome::ok())
        }
    }
}

fn load_tree(path: &Path) -> Result<lockstep::core::value::Node, Error> {
    let text = read_data_file(path).map_err(add_missing_file_hint)?;
    decode::reference_tree(&text, &path.display().to_string())
        .map_err(|err| err.with_path(path))
}
