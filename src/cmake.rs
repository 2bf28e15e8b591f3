//! Reads compile commands out of a CMake File API reply.
//!
//! Grounded in `examples/other_examples/5bd7cdf4_h-mathias-cmake-file-api-rs__src-objects-codemodel_v2-target.rs.rs`
//! for the `codemodel-v2` JSON shape (`#[serde(rename_all = "camelCase")]`,
//! `Target`/`CompileGroup`/`Source`/`CommandFragment`) and in
//! `examples/original_source/modules/cppscanner/cmakeIntegration/cmakeproject.cpp`
//! for how the scanner turns that reply into compile commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ScanError;
use crate::queue::ToolInvocation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyIndex {
    reply: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Codemodel {
    configurations: Vec<Configuration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Configuration {
    targets: Vec<TargetRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetRef {
    json_file: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Target {
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    compile_groups: Vec<CompileGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Source {
    path: String,
    compile_group_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompileGroup {
    #[serde(default)]
    source_indexes: Vec<usize>,
    #[serde(default)]
    compile_command_fragments: Vec<CommandFragment>,
    #[serde(default)]
    includes: Vec<IncludeEntry>,
    #[serde(default)]
    defines: Vec<DefineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandFragment {
    fragment: String,
}

#[derive(Debug, Deserialize)]
struct IncludeEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct DefineEntry {
    define: String,
}

/// Find the most recent `index-*.json` reply file under
/// `<build_dir>/.cmake/api/v1/reply`.
fn find_reply_index(build_dir: &Path) -> Result<PathBuf, ScanError> {
    let reply_dir = build_dir.join(".cmake/api/v1/reply");
    let mut candidates: Vec<PathBuf> = fs::read_dir(&reply_dir)
        .map_err(|source| ScanError::CompileCommands {
            path: reply_dir.display().to_string(),
            source,
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("index-") && n.ends_with(".json"))
        })
        .collect();
    candidates.sort();
    candidates
        .pop()
        .ok_or_else(|| ScanError::CMakeReply(format!("no index-*.json reply in {}", reply_dir.display())))
}

/// Write the query files CMake needs to see before it will emit a
/// `codemodel-v2` reply (`<build_dir>/.cmake/api/v1/query/codemodel-v2`).
pub fn write_codemodel_query(build_dir: &Path) -> std::io::Result<()> {
    let query_dir = build_dir.join(".cmake/api/v1/query");
    fs::create_dir_all(&query_dir)?;
    fs::write(query_dir.join("codemodel-v2"), "")?;
    Ok(())
}

/// Read every compile command out of a CMake build directory's File API
/// reply. Assumes CMake has already been (re-)configured after
/// [`write_codemodel_query`] was called.
pub fn read_compile_commands(build_dir: &Path) -> Result<Vec<ToolInvocation>, ScanError> {
    let reply_dir = build_dir.join(".cmake/api/v1/reply");
    let index_path = find_reply_index(build_dir)?;
    let index_content = fs::read_to_string(&index_path).map_err(|source| ScanError::CompileCommands {
        path: index_path.display().to_string(),
        source,
    })?;
    let index: ReplyIndex = serde_json::from_str(&index_content)?;

    let codemodel_file = index
        .reply
        .get("codemodel-v2")
        .and_then(|v| v.get("jsonFile"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ScanError::CMakeReply("reply index has no codemodel-v2 entry".to_string()))?;

    let codemodel_content = fs::read_to_string(reply_dir.join(codemodel_file)).map_err(|source| {
        ScanError::CompileCommands {
            path: codemodel_file.to_string(),
            source,
        }
    })?;
    let codemodel: Codemodel = serde_json::from_str(&codemodel_content)?;

    let mut invocations = Vec::new();
    for configuration in codemodel.configurations {
        for target_ref in configuration.targets {
            let target_content = fs::read_to_string(reply_dir.join(&target_ref.json_file)).map_err(|source| {
                ScanError::CompileCommands {
                    path: target_ref.json_file.clone(),
                    source,
                }
            })?;
            let target: Target = serde_json::from_str(&target_content)?;
            invocations.extend(target_invocations(&target, build_dir));
        }
    }
    Ok(invocations)
}

fn target_invocations(target: &Target, build_dir: &Path) -> Vec<ToolInvocation> {
    let mut out = Vec::new();
    for source in &target.sources {
        if !is_cpp_source(&source.path) {
            continue;
        }
        let Some(group_index) = source.compile_group_index else {
            continue;
        };
        let Some(group) = target.compile_groups.get(group_index) else {
            continue;
        };
        let mut arguments: Vec<String> = group
            .compile_command_fragments
            .iter()
            .map(|f| f.fragment.clone())
            .collect();
        for include in &group.includes {
            arguments.push(format!("-I{}", include.path));
        }
        for define in &group.defines {
            arguments.push(format!("-D{}", define.define));
        }
        out.push(ToolInvocation {
            source_file: source.path.clone(),
            arguments,
            directory: build_dir.display().to_string(),
        });
    }
    out
}

fn is_cpp_source(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    [".cpp", ".cc", ".cxx", ".c++", ".hpp", ".hh", ".hxx"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_cpp_source_recognizes_common_extensions() {
        assert!(is_cpp_source("a.cpp"));
        assert!(is_cpp_source("a.CC"));
        assert!(!is_cpp_source("a.rs"));
    }

    #[test]
    fn target_invocations_skips_sources_without_a_compile_group() {
        let target = Target {
            sources: vec![Source {
                path: "generated.h".to_string(),
                compile_group_index: None,
            }],
            compile_groups: vec![],
        };
        let invocations = target_invocations(&target, Path::new("/build"));
        assert!(invocations.is_empty());
    }

    #[test]
    fn target_invocations_builds_arguments_from_includes_and_defines() {
        let target = Target {
            sources: vec![Source {
                path: "main.cpp".to_string(),
                compile_group_index: Some(0),
            }],
            compile_groups: vec![CompileGroup {
                source_indexes: vec![0],
                compile_command_fragments: vec![CommandFragment {
                    fragment: "-std=c++20".to_string(),
                }],
                includes: vec![IncludeEntry {
                    path: "/usr/include".to_string(),
                }],
                defines: vec![DefineEntry {
                    define: "NDEBUG".to_string(),
                }],
            }],
        };
        let invocations = target_invocations(&target, Path::new("/build"));
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0].arguments.contains(&"-std=c++20".to_string()));
        assert!(invocations[0].arguments.contains(&"-I/usr/include".to_string()));
        assert!(invocations[0].arguments.contains(&"-DNDEBUG".to_string()));
    }
}
