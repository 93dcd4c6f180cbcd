use crate::error::{PencilfloorError, Result};
use crate::pencils::{PencilParam, PencilSource};
use crate::scheduler::Host;
use crate::stage::js_number;
use crate::widget::{InitParams, Pencilfloor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Widget configuration stored as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pencil_size: Option<f64>,
    /// Array of `{x, y, color}`; absent means the default arrangement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pencils: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
}

impl WidgetConfig {
    /// Snapshot of a widget's current settings and pencil positions
    pub fn from_widget(widget: &Pencilfloor) -> Self {
        let pencils = widget
            .pencils()
            .into_iter()
            .map(|pencil| {
                serde_json::json!({ "x": pencil.x, "y": pencil.y, "color": pencil.color })
            })
            .collect();
        Self {
            width: Some(widget.width() as f64),
            height: Some(widget.height() as f64),
            pencil_size: Some(widget.pencil_size()),
            pencils: Some(Value::Array(pencils)),
            quickness: Some(widget.quickness()),
            instant_rate: Some(widget.instant_rate()),
            interactive: Some(widget.interactive()),
        }
    }

    /// `<config dir>/pencilfloor/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pencilfloor").join("config.json"))
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PencilfloorError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PencilfloorError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Pencils to build; fails when `pencils` is present but not an array
    pub fn pencil_source(&self) -> Result<PencilSource> {
        match &self.pencils {
            None | Some(Value::Null) => Ok(PencilSource::Default),
            Some(Value::Array(items)) => {
                Ok(PencilSource::List(items.iter().map(pencil_param).collect()))
            }
            Some(_) => Err(PencilfloorError::InvalidPencils),
        }
    }

    pub fn init_params(&self) -> Result<InitParams> {
        Ok(InitParams {
            width: self.width,
            height: self.height,
            pencil_size: self.pencil_size,
            pencils: self.pencil_source()?,
        })
    }

    /// Apply the mutable properties to an initialized widget
    pub fn apply(&self, widget: &mut Pencilfloor, host: &mut dyn Host) -> Result<()> {
        if let Some(quickness) = self.quickness {
            widget.set_quickness(quickness)?;
        }
        if let Some(instant_rate) = self.instant_rate {
            widget.set_instant_rate(instant_rate)?;
        }
        if let Some(interactive) = self.interactive {
            widget.set_interactive(host, interactive);
        }
        Ok(())
    }
}

/// Coerce one JSON pencil entry; malformed coordinates become NaN and fail the range check
fn pencil_param(item: &Value) -> PencilParam {
    let coordinate = |key: &str| match item.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => js_number(s),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Null) => 0.0,
        _ => f64::NAN,
    };
    PencilParam {
        x: coordinate("x"),
        y: coordinate("y"),
        color: item.get("color").and_then(Value::as_str).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::FakeHost;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_save_and_load() {
        let config = WidgetConfig {
            width: Some(200.0),
            height: Some(100.0),
            pencil_size: Some(4.0),
            pencils: Some(serde_json::json!([{ "x": 1, "y": 2, "color": "red" }])),
            quickness: Some(0.5),
            instant_rate: Some(0.25),
            interactive: Some(true),
        };

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        config.save_to_file(&path).unwrap();
        let loaded = WidgetConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"pencilSize\""));
        assert!(json.contains("\"instantRate\""));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: WidgetConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WidgetConfig::default());
        let params = config.init_params().unwrap();
        assert!(matches!(params.pencils, PencilSource::Default));
        assert_eq!(serde_json::to_string(&config).unwrap(), "{}");
    }

    #[test]
    fn test_non_array_pencils() {
        for pencils in [
            serde_json::json!(42),
            serde_json::json!({ "x": 0 }),
            serde_json::json!("abc"),
        ] {
            let config = WidgetConfig {
                pencils: Some(pencils),
                ..Default::default()
            };
            assert!(matches!(config.pencil_source(), Err(PencilfloorError::InvalidPencils)));
        }
    }

    #[test]
    fn test_pencil_coercion() {
        let config: WidgetConfig = serde_json::from_str(
            r#"{ "pencils": [ { "x": "1.5", "y": null, "color": 7 }, { "y": 1 } ] }"#,
        )
        .unwrap();
        let PencilSource::List(params) = config.pencil_source().unwrap() else {
            panic!("expected a pencil list");
        };
        assert_eq!(params[0].x, 1.5);
        assert_eq!(params[0].y, 0.0);
        assert_eq!(params[0].color, None);
        assert!(params[1].x.is_nan());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut host = FakeHost::default();
        let mut widget = Pencilfloor::new(InitParams::default()).unwrap();
        widget.set_quickness(0.125).unwrap();
        let config = WidgetConfig::from_widget(&widget);

        let mut restored = Pencilfloor::new(config.init_params().unwrap()).unwrap();
        config.apply(&mut restored, &mut host).unwrap();
        assert_eq!(restored.pencils(), widget.pencils());
        assert_eq!(restored.quickness(), 0.125);
        assert_eq!(restored.width(), 300);
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let mut host = FakeHost::default();
        let mut widget = Pencilfloor::new(InitParams::default()).unwrap();
        let config = WidgetConfig {
            quickness: Some(3.0),
            ..Default::default()
        };
        assert!(config.apply(&mut widget, &mut host).unwrap_err().is_range_error());
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();
        let result = WidgetConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(PencilfloorError::Config(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = WidgetConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(PencilfloorError::Io(_))));
    }
}
