use crate::models::{CategoricalField, FilterState, Operator, Predicate, Query};
use std::collections::HashSet;

/// 将过滤器状态编译为后端查询结构
///
/// 纯函数，无副作用：相同状态总是产出结构相同的查询。
/// 组顺序固定为：搜索组、学习层级、学段、课表组、考试类型、院系。
pub fn build_query(state: &FilterState) -> Query {
    let mut predicates = Vec::new();

    // 每个搜索组编译为一个OR组：每个词同时生成子串匹配和整词匹配两个谓词，
    // 命中任意一种即视为匹配
    for entry in &state.searches {
        let key = entry.field.query_key();
        let mut group = Vec::with_capacity(entry.terms.len() * 2);
        for term in &entry.terms {
            group.push(Predicate::new(Operator::ContainsSubstring, key, term));
            group.push(Predicate::new(Operator::ContainsWord, key, term));
        }
        // 无搜索词的组仍然保留为空组，后端将其视为无约束
        predicates.push(group);
    }

    // 每个非空的分类字段编译为一个等值OR组，空字段不产生组
    for field in CategoricalField::ALL {
        let values = state.selected(field);
        if values.is_empty() {
            continue;
        }
        let key = field.query_key();
        let mut group = Vec::with_capacity(values.len());
        let mut seen = HashSet::new();
        for value in values {
            // 重复的选中值不重复产生谓词
            if seen.insert(value.as_str()) {
                group.push(Predicate::new(Operator::Equals, key, value));
            }
        }
        predicates.push(group);
    }

    Query { predicates }
}

/// 统计当前激活的筛选条件总数，用于界面上的角标显示
///
/// 每个搜索词和每个分类选中值各计为一条。
pub fn active_filter_count(state: &FilterState) -> usize {
    let term_count: usize = state.searches.iter().map(|entry| entry.terms.len()).sum();
    let value_count: usize = CategoricalField::ALL
        .iter()
        .map(|field| state.selected(*field).len())
        .sum();
    term_count + value_count
}
