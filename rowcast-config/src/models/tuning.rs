use anyhow::{Context, anyhow};
use rowcast_core::CarouselTuning;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Path to a TOML or JSON tuning file.
pub const TUNING_PATH_ENV: &str = "ROWCAST_TUNING_PATH";
/// Inline JSON tuning.
pub const TUNING_JSON_ENV: &str = "ROWCAST_TUNING_JSON";

const DEFAULT_FILES: &[&str] = &[
    "rowcast.toml",
    "rowcast.json",
    "config/rowcast.toml",
    "config/rowcast.json",
];

/// Source that produced the carousel tuning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TuningSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Load tuning overrides using environment variables.
/// Evaluation order:
/// 1) `$ROWCAST_TUNING_PATH` (TOML or JSON file),
/// 2) `$ROWCAST_TUNING_JSON` (inline JSON),
/// 3) `rowcast.{toml,json}` in the working directory or `config/`,
/// 4) defaults if none of those exist.
pub fn load_tuning_from_env() -> anyhow::Result<(CarouselTuning, TuningSource)> {
    resolve_tuning(|key| env::var(key).ok(), Path::new("."))
}

/// [`load_tuning_from_env`] with an explicit variable lookup and search
/// root for the default files.
pub fn resolve_tuning(
    var: impl Fn(&str) -> Option<String>,
    search_root: &Path,
) -> anyhow::Result<(CarouselTuning, TuningSource)> {
    if let Some(path_str) = var(TUNING_PATH_ENV)
        && !path_str.trim().is_empty()
    {
        let path = PathBuf::from(path_str);
        let tuning = load_tuning_from_file(&path)?;
        tracing::info!("carousel tuning loaded from {}", path.display());
        return Ok((tuning, TuningSource::EnvPath(path)));
    }

    if let Some(raw) = var(TUNING_JSON_ENV)
        && !raw.trim().is_empty()
    {
        let tuning = parse_json(&raw)
            .with_context(|| format!("failed to parse {TUNING_JSON_ENV}"))?;
        tracing::info!("carousel tuning loaded from {TUNING_JSON_ENV}");
        return Ok((tuning, TuningSource::EnvInline));
    }

    if let Some(path) = find_default_file(search_root) {
        let tuning = load_tuning_from_file(&path)?;
        tracing::info!("carousel tuning loaded from {}", path.display());
        return Ok((tuning, TuningSource::File(path)));
    }

    tracing::debug!("no carousel tuning overrides found, using defaults");
    Ok((CarouselTuning::default(), TuningSource::Default))
}

pub fn load_tuning_from_file(path: &Path) -> anyhow::Result<CarouselTuning> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read carousel tuning from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents)
            .with_context(|| format!("invalid carousel tuning {}", path.display())),
        Some("toml") => toml::from_str(&contents).map_err(|err| {
            anyhow!("invalid carousel tuning {}: {}", path.display(), err)
        }),
        _ => parse_tuning(&contents, &path.display().to_string()),
    }
}

/// Parse tuning of unknown format: TOML first, then JSON.
pub fn parse_tuning(contents: &str, origin: &str) -> anyhow::Result<CarouselTuning> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse carousel tuning {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

fn parse_json(raw: &str) -> anyhow::Result<CarouselTuning> {
    serde_json::from_str(raw)
        .map_err(|err| anyhow!("invalid carousel tuning json: {err}"))
}

fn find_default_file(root: &Path) -> Option<PathBuf> {
    DEFAULT_FILES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        let (tuning, source) = resolve_tuning(vars(&[]), dir.path()).unwrap();
        assert_eq!(source, TuningSource::Default);
        assert_eq!(tuning, CarouselTuning::default());
    }

    #[test]
    fn path_variable_wins_over_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tuning.toml");
        fs::write(&path, "preload_radius = 2\nbuffer_factor = 0.25\n").unwrap();

        let (tuning, source) = resolve_tuning(
            vars(&[
                (TUNING_PATH_ENV, path.to_str().unwrap()),
                (TUNING_JSON_ENV, r#"{"preload_radius": 9}"#),
            ]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(source, TuningSource::EnvPath(path));
        assert_eq!(tuning.preload_radius, 2);
        assert_eq!(tuning.buffer_factor, 0.25);
        assert_eq!(tuning.visible_row_budget, 6);
    }

    #[test]
    fn inline_json_is_used_when_path_is_blank() {
        let dir = tempfile::tempdir().unwrap();
        let (tuning, source) = resolve_tuning(
            vars(&[
                (TUNING_PATH_ENV, "  "),
                (TUNING_JSON_ENV, r#"{"scroll_duration_ms": 120}"#),
            ]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(source, TuningSource::EnvInline);
        assert_eq!(tuning.scroll_duration_ms, 120);
    }

    #[test]
    fn default_file_is_discovered_under_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        let path = dir.path().join("config/rowcast.json");
        fs::write(&path, r#"{"focus_scale": 1.2}"#).unwrap();

        let (tuning, source) = resolve_tuning(vars(&[]), dir.path()).unwrap();
        assert_eq!(source, TuningSource::File(path));
        assert_eq!(tuning.focus_scale, 1.2);
    }

    #[test]
    fn unknown_extension_tries_both_formats() {
        let from_toml = parse_tuning("cleanup_multiplier = 4", "inline").unwrap();
        assert_eq!(from_toml.cleanup_multiplier, 4);

        let from_json = parse_tuning(r#"{"cleanup_multiplier": 5}"#, "inline").unwrap();
        assert_eq!(from_json.cleanup_multiplier, 5);

        let err = parse_tuning("cleanup_multiplier = [", "broken.cfg").unwrap_err();
        assert!(err.to_string().contains("broken.cfg"));
    }

    #[test]
    fn broken_inline_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_tuning(vars(&[(TUNING_JSON_ENV, "{")]), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains(TUNING_JSON_ENV));
    }
}
