use serde::Serialize;
use std::rc::Rc;
use store_common::storage::{MemoryStorage, StorageAdapter};
use wasm_bindgen::prelude::*;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod models;
pub mod store;

use builder::{active_filter_count, build_query};
use models::{CategoricalField, FilterState, Query, SearchEntry, SearchField};
use store::FilterStore;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    "2.0.0".to_string()
}

/// 会话存储适配器 - 封装浏览器的sessionStorage
pub struct SessionStorage {
    storage: web_sys::Storage,
}

impl SessionStorage {
    /// 获取浏览器会话存储，无窗口环境(SSR)时返回None
    pub fn open() -> Option<SessionStorage> {
        let storage = web_sys::window()?.session_storage().ok()??;
        Some(SessionStorage { storage })
    }
}

impl StorageAdapter for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        // 读取异常视为没有值
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        // 写入失败（如配额耗尽）时退化为仅内存状态
        if self.storage.set_item(key, value).is_err() {
            console::log_1(&JsValue::from_str(&format!("会话存储写入失败: {}", key)));
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// 订阅回调收到的派生快照：状态、编译后的查询和激活条件数
#[derive(Serialize)]
struct FilterSnapshot {
    /// 当前过滤器状态
    state: FilterState,
    /// 编译后的查询结构
    query: Query,
    /// 激活的筛选条件数量
    active_filters: usize,
}

/// 从状态构建派生快照
fn snapshot(state: &FilterState) -> FilterSnapshot {
    FilterSnapshot {
        state: state.clone(),
        query: build_query(state),
        active_filters: active_filter_count(state),
    }
}

/// 过滤器JS接口 - 提供给页面使用的筛选状态与查询API
///
/// 实例由页面的组合根持有，不使用全局单例。
#[wasm_bindgen]
pub struct FilterStoreJS {
    store: FilterStore,
}

#[wasm_bindgen]
impl FilterStoreJS {
    /// 创建过滤器存储，浏览器环境下持久化到sessionStorage
    #[wasm_bindgen(constructor)]
    pub fn new() -> FilterStoreJS {
        console_error_panic_hook::set_once();

        let storage: Rc<dyn StorageAdapter> = match SessionStorage::open() {
            Some(session) => Rc::new(session),
            // 无浏览器环境时降级为纯内存存储，行为保持一致
            None => Rc::new(MemoryStorage::new()),
        };

        FilterStoreJS {
            store: FilterStore::new(storage),
        }
    }

    /// 当前过滤器状态
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.store.state())
            .map_err(|e| JsValue::from_str(&format!("序列化过滤器状态失败: {}", e)))
    }

    /// 当前状态编译出的查询结构
    pub fn query(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&build_query(&self.store.state()))
            .map_err(|e| JsValue::from_str(&format!("序列化查询失败: {}", e)))
    }

    /// 激活的筛选条件数量
    pub fn active_count(&self) -> usize {
        active_filter_count(&self.store.state())
    }

    /// 追加一个搜索组，terms_json为搜索词的JSON数组
    pub fn add_search(&self, terms_json: &str, field: &str) -> Result<(), JsValue> {
        let terms: Vec<String> = serde_json::from_str(terms_json)
            .map_err(|e| JsValue::from_str(&format!("解析搜索词失败: {}", e)))?;
        let field = SearchField::parse(field)
            .ok_or_else(|| JsValue::from_str(&format!("未知的搜索字段: {}", field)))?;

        self.store.add_search(SearchEntry { terms, field });
        Ok(())
    }

    /// 按下标移除搜索组，越界时为空操作
    pub fn remove_search(&self, index: usize) {
        self.store.remove_search(index);
    }

    /// 切换分类筛选值的选中状态
    pub fn toggle(&self, field: &str, value: &str) -> Result<(), JsValue> {
        let field = CategoricalField::parse(field)
            .ok_or_else(|| JsValue::from_str(&format!("未知的筛选字段: {}", field)))?;

        self.store.toggle(field, value);
        Ok(())
    }

    /// 清空全部筛选条件
    pub fn clear_all(&self) {
        self.store.clear_all();
    }

    /// 订阅状态变更，返回用于退订的ID
    ///
    /// 回调立即收到一次当前快照，之后每次变更都会收到重新编译的快照。
    pub fn subscribe(&self, callback: js_sys::Function) -> usize {
        self.store.subscribe(move |state| {
            let value = match serde_wasm_bindgen::to_value(&snapshot(state)) {
                Ok(value) => value,
                Err(e) => {
                    console::log_1(&JsValue::from_str(&format!("序列化快照失败: {}", e)));
                    return;
                }
            };
            if callback.call1(&JsValue::NULL, &value).is_err() {
                console::log_1(&JsValue::from_str("订阅回调执行失败"));
            }
        })
    }

    /// 取消订阅，未知ID为空操作
    pub fn unsubscribe(&self, id: usize) {
        self.store.unsubscribe(id);
    }
}
