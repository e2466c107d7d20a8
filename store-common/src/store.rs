use crate::storage::StorageAdapter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// 持久化响应式存储 - 值变更时同步通知订阅者并镜像到会话存储
///
/// 单线程事件循环模型：所有操作在调用方回合内同步完成，没有挂起点。
/// 持久化使用JSON文本格式，必须能通过serde_json精确往返。
pub struct Store<T> {
    /// 持久化键
    key: String,
    /// 当前值
    value: RefCell<T>,
    /// 订阅表：订阅ID -> 回调，按订阅顺序通知
    subscribers: RefCell<BTreeMap<usize, Subscriber<T>>>,
    /// 下一个订阅ID，单调递增
    next_id: Cell<usize>,
    /// 注入的存储适配器
    storage: Rc<dyn StorageAdapter>,
}

/// 将值序列化后写入存储，序列化失败时静默跳过
fn persist<T: Serialize>(storage: &dyn StorageAdapter, key: &str, value: &T) {
    if let Ok(text) = serde_json::to_string(value) {
        storage.set(key, &text);
    }
}

impl<T: Serialize + DeserializeOwned + Clone> Store<T> {
    /// 创建存储：已有持久化值时加载，否则立即写入初始值
    ///
    /// 无法解析的历史值视为不存在，回退到初始值，绝不报错。
    pub fn create(key: &str, initial: T, storage: Rc<dyn StorageAdapter>) -> Self {
        let loaded = storage
            .get(key)
            .and_then(|text| serde_json::from_str::<T>(&text).ok());

        let value = match loaded {
            Some(existing) => existing,
            None => {
                // 写直达，保证存储与内存状态从一开始就一致
                persist(storage.as_ref(), key, &initial);
                initial
            }
        };

        Store {
            key: key.to_string(),
            value: RefCell::new(value),
            subscribers: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
            storage,
        }
    }

    /// 持久化键
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 当前值的快照
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// 替换当前值：先持久化，再按订阅顺序同步通知所有订阅者
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        let current = self.value.borrow().clone();
        persist(self.storage.as_ref(), &self.key, &current);
        self.notify(&current);
    }

    /// 用函数变换当前值
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let next = f(self.get());
        self.set(next);
    }

    /// 注册订阅回调并立即用当前值调用一次，返回可用于退订的ID
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> usize {
        let current = self.get();
        callback(&current);

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().insert(id, Rc::new(callback));
        id
    }

    /// 移除订阅，未知ID为空操作
    pub fn unsubscribe(&self, id: usize) {
        self.subscribers.borrow_mut().remove(&id);
    }

    /// 通知所有订阅者，BTreeMap保证按订阅ID升序遍历
    ///
    /// 先快照回调列表再释放借用，回调内可以安全地订阅或退订；
    /// 通知期间的订阅表变更从下一次通知起生效。
    fn notify(&self, value: &T) {
        let callbacks: Vec<Subscriber<T>> = self.subscribers.borrow().values().cloned().collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

/// 校验持久化数据的模式版本
///
/// 标记缺失、无法解析或与当前版本不同时，清空所有受管键并重写标记，
/// 返回true表示执行了重置。必须在受管键上创建任何Store之前调用，
/// 避免订阅者读到过期的数据形状。
pub fn ensure_schema_version(
    storage: &dyn StorageAdapter,
    version_key: &str,
    current: u32,
    managed_keys: &[&str],
) -> bool {
    let stored = storage
        .get(version_key)
        .and_then(|text| text.parse::<u32>().ok());

    if stored == Some(current) {
        return false;
    }

    // 整体清空而不是逐字段修补，避免半迁移的数据形状
    for key in managed_keys {
        storage.remove(key);
    }
    storage.set(version_key, &current.to_string());
    true
}
