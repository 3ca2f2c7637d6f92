use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::models::PackageManifest;

/// 去重键：精确的（包名，版本）组合
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub version: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// 某个包在某个安装位置的一次观测
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// 包名
    pub name: String,
    
    /// 版本号
    pub version: String,
    
    /// 安装目录
    pub location: PathBuf,
    
    /// 安装目录下所有文件的总字节数
    pub size: u64,
}

impl UsageRecord {
    pub fn new(manifest: PackageManifest, location: PathBuf, size: u64) -> Self {
        Self {
            name: manifest.name,
            version: manifest.version,
            location,
            size,
        }
    }
    
    pub fn identity(&self) -> Identity {
        Identity::new(self.name.clone(), self.version.clone())
    }
}

/// 按 Identity 分组的使用记录表，每组内部保持发现顺序
#[derive(Debug, Clone, Default)]
pub struct PackageTable {
    entries: HashMap<Identity, Vec<UsageRecord>>,
}

impl PackageTable {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// 追加一条记录，首次出现的 Identity 会新建分组
    pub fn insert(&mut self, record: UsageRecord) {
        self.entries
            .entry(record.identity())
            .or_default()
            .push(record);
    }
    
    /// 把另一张表按顺序合并进来（other 的记录排在已有记录之后）
    pub fn merge(&mut self, other: PackageTable) {
        for (identity, records) in other.entries {
            self.entries.entry(identity).or_default().extend(records);
        }
    }
    
    pub fn get(&self, identity: &Identity) -> Option<&[UsageRecord]> {
        self.entries.get(identity).map(Vec::as_slice)
    }
    
    /// 不同 Identity 的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    /// 记录总数
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
    
    /// 转换为报告行，按包名、版本严格排序
    pub fn into_sorted_usages(self) -> Vec<AggregatedUsage> {
        let mut usages: Vec<AggregatedUsage> = self
            .entries
            .into_iter()
            .filter_map(|(identity, records)| AggregatedUsage::from_records(identity, records))
            .collect();
        
        usages.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.version.cmp(&b.version))
        });
        
        usages
    }
}

/// 报告中的一行：某个 Identity 在所有项目中的汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedUsage {
    /// 包名
    pub name: String,
    
    /// 版本号
    pub version: String,
    
    /// 所有安装位置的记录（发现顺序）
    pub records: Vec<UsageRecord>,
    
    /// 代表大小：第一个被发现的安装的大小，不对其他实例重新计算
    pub size: u64,
}

impl AggregatedUsage {
    /// 由同一 Identity 的记录构造，记录为空时返回 None
    pub fn from_records(identity: Identity, records: Vec<UsageRecord>) -> Option<Self> {
        let size = records.first()?.size;
        
        Some(Self {
            name: identity.name,
            version: identity.version,
            records,
            size,
        })
    }
    
    /// 安装实例数量
    pub fn instance_count(&self) -> usize {
        self.records.len()
    }
    
    /// 实例数量 × 代表大小
    pub fn total_size(&self) -> u64 {
        // 超出 u64 范围时饱和，不会溢出
        (self.instance_count() as u64).saturating_mul(self.size)
    }
    
    pub fn identity(&self) -> Identity {
        Identity::new(self.name.clone(), self.version.clone())
    }
}
