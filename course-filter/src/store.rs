use crate::models::{
    CategoricalField, FilterState, SearchEntry, FILTERS_KEY, SCHEMA_VERSION, VERSION_KEY,
};
use std::rc::Rc;
use store_common::storage::StorageAdapter;
use store_common::store::{ensure_schema_version, Store};

/// 过滤器存储 - 筛选条件变更的唯一入口
///
/// 状态只能通过这里定义的更新操作修改，外部代码拿到的都是快照。
/// 存活于整个浏览会话，只有显式清空或版本迁移会重置它。
pub struct FilterStore {
    inner: Store<FilterState>,
}

impl FilterStore {
    /// 创建过滤器存储
    ///
    /// 先做版本校验：持久化形状过期时，在任何订阅者建立之前
    /// 整体清空受管键，然后再加载或初始化状态。
    pub fn new(storage: Rc<dyn StorageAdapter>) -> FilterStore {
        ensure_schema_version(storage.as_ref(), VERSION_KEY, SCHEMA_VERSION, &[FILTERS_KEY]);
        FilterStore {
            inner: Store::create(FILTERS_KEY, FilterState::default(), storage),
        }
    }

    /// 当前状态的快照
    pub fn state(&self) -> FilterState {
        self.inner.get()
    }

    /// 追加一个搜索组
    pub fn add_search(&self, entry: SearchEntry) {
        self.inner.update(|mut state| {
            state.searches.push(entry);
            state
        });
    }

    /// 按下标移除搜索组，越界时不产生任何变更或通知
    pub fn remove_search(&self, index: usize) {
        if index >= self.state().searches.len() {
            return;
        }
        self.inner.update(|mut state| {
            state.searches.remove(index);
            state
        });
    }

    /// 切换分类字段中某个值的选中状态
    ///
    /// 未选中则加入，已选中则移除，保证集合语义。
    pub fn toggle(&self, field: CategoricalField, value: &str) {
        self.inner.update(|mut state| {
            let values = state.selected_mut(field);
            match values.iter().position(|v| v == value) {
                Some(index) => {
                    values.remove(index);
                }
                None => values.push(value.to_string()),
            }
            state
        });
    }

    /// 清空全部筛选条件
    pub fn clear_all(&self) {
        self.inner.set(FilterState::default());
    }

    /// 订阅状态变更，回调立即收到一次当前状态
    pub fn subscribe(&self, callback: impl Fn(&FilterState) + 'static) -> usize {
        self.inner.subscribe(callback)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, id: usize) {
        self.inner.unsubscribe(id);
    }
}
