use std::cell::RefCell;
use std::collections::HashMap;

/// 存储适配器 - 会话级键值存储的统一接口
///
/// 浏览器环境下由sessionStorage实现，SSR或测试环境下由内存实现。
/// 存储能力在构造Store时注入，核心逻辑不依赖任何运行时环境。
pub trait StorageAdapter {
    /// 读取键对应的文本值，键不存在时返回None
    fn get(&self, key: &str) -> Option<String>;
    /// 写入键值对，覆盖已有值
    fn set(&self, key: &str, value: &str);
    /// 删除键，键不存在时为空操作
    fn remove(&self, key: &str);
}

/// 内存存储 - 无浏览器环境(SSR)下的降级实现
///
/// 值只在当前实例的生命周期内存在，不跨页面刷新。
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}
