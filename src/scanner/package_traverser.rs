use std::path::Path;

use crate::config::{Config, ErrorPolicy};
use crate::models::{PackageTable, ScanIssue, UsageRecord};
use crate::scanner::error::{Result, ScanError};
use crate::scanner::listing::{read_dir_sorted, ListedEntry};
use crate::scanner::{ManifestReader, SizeCalculator};

/// 包遍历器 - 遍历一个依赖目录（如 node_modules）的直接子目录
///
/// 只处理第一层已安装的包，不会深入包内部嵌套的依赖目录。
pub struct PackageTraverser {
    manifest_reader: ManifestReader,
    size_calculator: SizeCalculator,
    error_policy: ErrorPolicy,
    include_scoped: bool,
}

/// 一次遍历的结果
#[derive(Debug, Clone, Default)]
pub struct TraversalOutcome {
    /// 检查过的目录条目数量（包括被跳过的条目）
    pub entries: usize,

    /// 已记录的包安装数量
    pub packages: usize,

    /// 在 isolate 策略下被记录的错误
    pub issues: Vec<ScanIssue>,
}

impl PackageTraverser {
    pub fn new(
        manifest_reader: ManifestReader,
        size_calculator: SizeCalculator,
        error_policy: ErrorPolicy,
    ) -> Self {
        Self {
            manifest_reader,
            size_calculator,
            error_policy,
            include_scoped: false,
        }
    }

    /// 根据配置创建遍历器
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ManifestReader::new(config.layout.package_manifest.clone()),
            SizeCalculator::new().with_follow_links(config.scan.follow_symlinks),
            config.scan.error_policy,
        )
        .with_scoped_packages(config.scan.include_scoped)
    }

    /// 是否展开 `@scope` 目录
    pub fn with_scoped_packages(mut self, include_scoped: bool) -> Self {
        self.include_scoped = include_scoped;
        self
    }

    /// 遍历依赖目录，把发现的包追加到 `table`
    ///
    /// 在 fail-fast 策略下第一个错误会立即返回，已经追加到表中的记录保留不变。
    pub fn traverse(&self, dependency_dir: &Path, table: &mut PackageTable) -> Result<TraversalOutcome> {
        let entries = read_dir_sorted(dependency_dir)?;
        let mut outcome = TraversalOutcome {
            entries: entries.len(),
            ..Default::default()
        };

        for entry in entries.iter().filter(|e| e.is_dir) {
            self.visit_entry(entry, table, &mut outcome)?;
        }

        tracing::debug!(
            "遍历 {}: {} 个条目, {} 个包",
            dependency_dir.display(),
            outcome.entries,
            outcome.packages
        );

        Ok(outcome)
    }

    fn visit_entry(
        &self,
        entry: &ListedEntry,
        table: &mut PackageTable,
        outcome: &mut TraversalOutcome,
    ) -> Result<()> {
        match self.visit_package(&entry.path, table) {
            Ok(true) => outcome.packages += 1,
            Ok(false) if self.include_scoped && entry.name.starts_with('@') => {
                self.visit_scope(entry, table, outcome)?;
            }
            Ok(false) => {
                tracing::debug!("跳过没有清单的目录: {}", entry.path.display());
            }
            Err(err) => self.isolate(err, &entry.path, outcome)?,
        }

        Ok(())
    }

    /// 展开 `@scope` 目录下的包
    fn visit_scope(
        &self,
        scope: &ListedEntry,
        table: &mut PackageTable,
        outcome: &mut TraversalOutcome,
    ) -> Result<()> {
        let entries = match read_dir_sorted(&scope.path) {
            Ok(entries) => entries,
            Err(err) => return self.isolate(err, &scope.path, outcome),
        };
        outcome.entries += entries.len();

        for entry in entries.iter().filter(|e| e.is_dir) {
            match self.visit_package(&entry.path, table) {
                Ok(true) => outcome.packages += 1,
                Ok(false) => {}
                Err(err) => self.isolate(err, &entry.path, outcome)?,
            }
        }

        Ok(())
    }

    /// 处理单个包目录，返回是否记录了该包
    fn visit_package(&self, package_dir: &Path, table: &mut PackageTable) -> Result<bool> {
        let Some(manifest) = self.manifest_reader.read(package_dir)? else {
            return Ok(false);
        };

        let size = self.size_calculator.calculate_directory_size(package_dir)?;
        table.insert(UsageRecord::new(manifest, package_dir.to_path_buf(), size));

        Ok(true)
    }

    /// 按错误策略处理单个包的错误
    fn isolate(&self, err: ScanError, path: &Path, outcome: &mut TraversalOutcome) -> Result<()> {
        match self.error_policy {
            ErrorPolicy::FailFast => Err(err),
            ErrorPolicy::Isolate => {
                tracing::warn!("跳过出错的包 {}: {}", path.display(), err);
                outcome.issues.push(ScanIssue::package(path, &err));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use tempfile::tempdir;
    use std::fs;

    fn traverser(policy: ErrorPolicy) -> PackageTraverser {
        PackageTraverser::new(ManifestReader::new("package.json"), SizeCalculator::new(), policy)
    }

    fn write_package(dir: &Path, name: &str, version: &str, payload: usize) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        ).unwrap();
        fs::write(dir.join("index.js"), vec![b'x'; payload]).unwrap();
    }

    #[test]
    fn test_traverse_collects_packages() {
        let temp_dir = tempdir().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        write_package(&node_modules.join("chalk"), "chalk", "5.3.0", 300);
        write_package(&node_modules.join("ms"), "ms", "2.1.3", 100);

        // 没有清单的目录和普通文件都会被计数但不记录
        fs::create_dir(node_modules.join(".bin")).unwrap();
        fs::write(node_modules.join(".package-lock.json"), "{}").unwrap();

        let mut table = PackageTable::new();
        let outcome = traverser(ErrorPolicy::FailFast)
            .traverse(&node_modules, &mut table)
            .unwrap();

        assert_eq!(outcome.entries, 4);
        assert_eq!(outcome.packages, 2);
        assert!(outcome.issues.is_empty());
        assert_eq!(table.len(), 2);

        let chalk = table.get(&Identity::new("chalk", "5.3.0")).unwrap();
        assert_eq!(chalk.len(), 1);
        assert_eq!(chalk[0].location, node_modules.join("chalk"));
        let manifest_len = fs::metadata(node_modules.join("chalk").join("package.json")).unwrap().len();
        assert_eq!(chalk[0].size, 300 + manifest_len);
    }

    #[test]
    fn test_traverse_is_shallow() {
        let temp_dir = tempdir().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        let outer = node_modules.join("express");
        write_package(&outer, "express", "4.18.2", 10);
        write_package(&outer.join("node_modules").join("debug"), "debug", "2.6.9", 10);

        let mut table = PackageTable::new();
        traverser(ErrorPolicy::FailFast).traverse(&node_modules, &mut table).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.get(&Identity::new("debug", "2.6.9")).is_none());
    }

    #[test]
    fn test_fail_fast_on_invalid_manifest() {
        let temp_dir = tempdir().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        write_package(&node_modules.join("a-good"), "a-good", "1.0.0", 10);
        let bad = node_modules.join("b-bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("package.json"), r#"{"name": "b-bad", "version": 2}"#).unwrap();
        write_package(&node_modules.join("c-good"), "c-good", "1.0.0", 10);

        let mut table = PackageTable::new();
        let err = traverser(ErrorPolicy::FailFast)
            .traverse(&node_modules, &mut table)
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidManifest { .. }));
        // 出错前已记录的包保留在表中，出错后的包不再处理
        assert!(table.get(&Identity::new("a-good", "1.0.0")).is_some());
        assert!(table.get(&Identity::new("c-good", "1.0.0")).is_none());
    }

    #[test]
    fn test_isolate_continues_after_invalid_manifest() {
        let temp_dir = tempdir().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        let bad = node_modules.join("a-bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("package.json"), "not json").unwrap();
        write_package(&node_modules.join("b-good"), "b-good", "1.0.0", 10);

        let mut table = PackageTable::new();
        let outcome = traverser(ErrorPolicy::Isolate)
            .traverse(&node_modules, &mut table)
            .unwrap();

        assert_eq!(outcome.packages, 1);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].path, bad);
        assert!(table.get(&Identity::new("b-good", "1.0.0")).is_some());
    }

    #[test]
    fn test_scoped_packages() {
        let temp_dir = tempdir().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        let scope = node_modules.join("@babel");
        write_package(&scope.join("core"), "@babel/core", "7.24.0", 10);
        write_package(&scope.join("parser"), "@babel/parser", "7.24.0", 10);

        let mut shallow = PackageTable::new();
        let outcome = traverser(ErrorPolicy::FailFast)
            .traverse(&node_modules, &mut shallow)
            .unwrap();
        assert_eq!(outcome.entries, 1);
        assert!(shallow.is_empty());

        let mut expanded = PackageTable::new();
        let outcome = traverser(ErrorPolicy::FailFast)
            .with_scoped_packages(true)
            .traverse(&node_modules, &mut expanded)
            .unwrap();
        assert_eq!(outcome.entries, 3);
        assert_eq!(outcome.packages, 2);
        assert!(expanded.get(&Identity::new("@babel/core", "7.24.0")).is_some());
    }

    #[test]
    fn test_missing_dependency_dir_is_error() {
        let temp_dir = tempdir().unwrap();
        let mut table = PackageTable::new();
        let err = traverser(ErrorPolicy::Isolate)
            .traverse(&temp_dir.path().join("node_modules"), &mut table)
            .unwrap_err();
        assert!(matches!(err, ScanError::ReadDir { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_follow_symlinks_from_config() {
        let temp_dir = tempdir().unwrap();
        let shared = temp_dir.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("blob.bin"), vec![0u8; 2000]).unwrap();

        let node_modules = temp_dir.path().join("node_modules");
        write_package(&node_modules.join("ms"), "ms", "2.1.3", 0);
        std::os::unix::fs::symlink(&shared, node_modules.join("ms").join("shared")).unwrap();
        let identity = Identity::new("ms", "2.1.3");

        let mut config = Config::default();
        let mut table = PackageTable::new();
        PackageTraverser::from_config(&config).traverse(&node_modules, &mut table).unwrap();
        assert!(table.get(&identity).unwrap()[0].size < 2000);

        config.scan.follow_symlinks = true;
        let mut table = PackageTable::new();
        PackageTraverser::from_config(&config).traverse(&node_modules, &mut table).unwrap();
        assert!(table.get(&identity).unwrap()[0].size > 2000);
    }
}
