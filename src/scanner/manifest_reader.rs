use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde_json::{Map, Value};

use crate::models::PackageManifest;
use crate::scanner::error::{Result, ScanError};

/// 清单读取器 - 从已安装包目录中读取 package.json 的 name 和 version
#[derive(Debug, Clone)]
pub struct ManifestReader {
    /// 清单文件名
    file_name: String,
}

impl ManifestReader {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// 包目录中清单文件的路径
    pub fn manifest_path(&self, package_dir: &Path) -> PathBuf {
        package_dir.join(&self.file_name)
    }

    /// 读取包目录的清单
    ///
    /// 清单文件不存在时返回 `Ok(None)`，调用方应跳过该条目。
    pub fn read(&self, package_dir: &Path) -> Result<Option<PackageManifest>> {
        let path = self.manifest_path(package_dir);

        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ScanError::ReadManifest { path, source }),
        };

        Self::parse(&path, &raw).map(Some)
    }

    /// 解析清单内容并校验 name/version 字段
    pub fn parse(path: &Path, raw: &[u8]) -> Result<PackageManifest> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|err| ScanError::invalid_manifest(path, format!("JSON 解析失败: {err}")))?;

        let object = value
            .as_object()
            .ok_or_else(|| ScanError::invalid_manifest(path, "顶层不是 JSON 对象"))?;

        Ok(PackageManifest {
            name: Self::string_field(path, object, "name")?,
            version: Self::string_field(path, object, "version")?,
        })
    }

    fn string_field(path: &Path, object: &Map<String, Value>, field: &str) -> Result<String> {
        match object.get(field) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(ScanError::invalid_manifest(
                path,
                format!("字段 `{field}` 应为字符串，实际为 {}", json_type_name(other)),
            )),
            None => Err(ScanError::invalid_manifest(path, format!("缺少字段 `{field}`"))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "数组",
        Value::Object(_) => "对象",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    fn reader() -> ManifestReader {
        ManifestReader::new("package.json")
    }

    #[test]
    fn test_read_valid_manifest() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"name": "left-pad", "version": "1.0.0", "main": "index.js"}"#,
        ).unwrap();

        let manifest = reader().read(temp_dir.path()).unwrap().unwrap();
        assert_eq!(manifest.name, "left-pad");
        assert_eq!(manifest.version, "1.0.0");
    }

    #[test]
    fn test_missing_manifest_is_absent() {
        let temp_dir = tempdir().unwrap();
        assert!(reader().read(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_numeric_version_is_invalid() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("package.json"),
            r#"{"name": "left-pad", "version": 1}"#,
        ).unwrap();

        let err = reader().read(temp_dir.path()).unwrap_err();
        match err {
            ScanError::InvalidManifest { reason, .. } => assert!(reason.contains("version")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let err = ManifestReader::parse(Path::new("package.json"), br#"{"version": "1.0.0"}"#)
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidManifest { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_malformed_json_is_invalid() {
        let err = ManifestReader::parse(Path::new("package.json"), b"{ not json").unwrap_err();
        assert!(matches!(err, ScanError::InvalidManifest { .. }));
    }

    #[test]
    fn test_non_object_is_invalid() {
        let err = ManifestReader::parse(Path::new("package.json"), b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ScanError::InvalidManifest { .. }));
    }

    #[test]
    fn test_custom_file_name() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("manifest.json"),
            r#"{"name": "pkg", "version": "0.1.0"}"#,
        ).unwrap();

        let reader = ManifestReader::new("manifest.json");
        assert_eq!(reader.read(temp_dir.path()).unwrap().unwrap().name, "pkg");
        assert!(ManifestReader::new("package.json").read(temp_dir.path()).unwrap().is_none());
    }
}
