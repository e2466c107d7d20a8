use serde::{Deserialize, Serialize};

/// 过滤器持久化数据的当前模式版本
///
/// 持久化形状变更时必须递增，旧会话的数据会被整体重置。
pub const SCHEMA_VERSION: u32 = 2;

/// 过滤器状态的会话存储键
pub const FILTERS_KEY: &str = "filters";

/// 版本标记的会话存储键
pub const VERSION_KEY: &str = "version";

/// 自由文本搜索的目标字段
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// 课程标题
    Title,
    /// 授课教师姓名
    Employee,
    /// 课程描述
    Description,
}

impl SearchField {
    /// 后端查询中使用的字段名
    pub fn query_key(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Employee => "employee",
            SearchField::Description => "description",
        }
    }

    /// 从JS侧传入的标签解析字段
    pub fn parse(tag: &str) -> Option<SearchField> {
        match tag {
            "title" => Some(SearchField::Title),
            "employee" => Some(SearchField::Employee),
            "description" => Some(SearchField::Description),
            _ => None,
        }
    }
}

/// 搜索组 - 一组作用于同一字段的搜索词
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchEntry {
    /// 搜索词列表，保持用户输入顺序
    pub terms: Vec<String>,
    /// 目标字段
    pub field: SearchField,
}

/// 分类筛选字段 - 封闭词表上的多选条件
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoricalField {
    /// 学习层级（Bachelor/Master等）
    StudyLevel,
    /// 开课学段编号
    Block,
    /// 课表组（A-D）
    ScheduleGroup,
    /// 考试类型
    ExamType,
    /// 开课院系
    Department,
}

impl CategoricalField {
    /// 编译查询时的固定字段顺序
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::StudyLevel,
        CategoricalField::Block,
        CategoricalField::ScheduleGroup,
        CategoricalField::ExamType,
        CategoricalField::Department,
    ];

    /// 后端查询中使用的字段名
    pub fn query_key(&self) -> &'static str {
        match self {
            CategoricalField::StudyLevel => "study_level",
            CategoricalField::Block => "start_block",
            CategoricalField::ScheduleGroup => "schedule_group",
            CategoricalField::ExamType => "exam_type",
            CategoricalField::Department => "department",
        }
    }

    /// 从JS侧传入的标签解析字段
    pub fn parse(tag: &str) -> Option<CategoricalField> {
        match tag {
            "study_level" => Some(CategoricalField::StudyLevel),
            "block" => Some(CategoricalField::Block),
            "schedule_group" => Some(CategoricalField::ScheduleGroup),
            "exam_type" => Some(CategoricalField::ExamType),
            "department" => Some(CategoricalField::Department),
            _ => None,
        }
    }
}

/// 过滤器状态 - 当前会话中用户选择的全部筛选条件
///
/// 除searches外每个字段都是集合语义：更新操作保证值不重复，
/// 空集合表示该字段不加约束而不是不匹配任何课程。
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    /// 自由文本搜索组
    pub searches: Vec<SearchEntry>,
    /// 学习层级
    pub study_level: Vec<String>,
    /// 开课学段编号（统一存为字符串）
    pub block: Vec<String>,
    /// 课表组
    pub schedule_group: Vec<String>,
    /// 考试类型
    pub exam_type: Vec<String>,
    /// 开课院系
    pub department: Vec<String>,
}

impl FilterState {
    /// 指定分类字段当前选中的值
    pub fn selected(&self, field: CategoricalField) -> &Vec<String> {
        match field {
            CategoricalField::StudyLevel => &self.study_level,
            CategoricalField::Block => &self.block,
            CategoricalField::ScheduleGroup => &self.schedule_group,
            CategoricalField::ExamType => &self.exam_type,
            CategoricalField::Department => &self.department,
        }
    }

    /// 指定分类字段选中值的可变引用
    pub fn selected_mut(&mut self, field: CategoricalField) -> &mut Vec<String> {
        match field {
            CategoricalField::StudyLevel => &mut self.study_level,
            CategoricalField::Block => &mut self.block,
            CategoricalField::ScheduleGroup => &mut self.schedule_group,
            CategoricalField::ExamType => &mut self.exam_type,
            CategoricalField::Department => &mut self.department,
        }
    }
}

/// 谓词操作符，序列化为后端约定的紧凑符号标签
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// 精确匹配，用于分类字段
    #[serde(rename = "==")]
    Equals,
    /// 子串匹配，用于自由文本
    #[serde(rename = "%>")]
    ContainsSubstring,
    /// 整词匹配，用于自由文本
    #[serde(rename = "~>")]
    ContainsWord,
}

/// 单个原子匹配条件
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Predicate {
    /// 匹配操作符
    pub op: Operator,
    /// 目标字段名
    pub field: String,
    /// 匹配值
    pub value: String,
}

impl Predicate {
    /// 构造谓词
    pub fn new(op: Operator, field: &str, value: &str) -> Predicate {
        Predicate {
            op,
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// 查询结构 - 发送给搜索接口的最终产物
///
/// 每个内层列表是一个OR组，外层列表由后端按AND组合。
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// 谓词组列表
    pub predicates: Vec<Vec<Predicate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_state_roundtrip() {
        let state = FilterState {
            searches: vec![SearchEntry {
                terms: vec!["Lineær".to_string(), "Algebra".to_string()],
                field: SearchField::Title,
            }],
            study_level: vec!["Bachelor".to_string()],
            block: vec!["3".to_string(), "4".to_string()],
            schedule_group: vec!["A".to_string()],
            exam_type: vec!["oral".to_string()],
            department: vec!["DIKU".to_string()],
        };

        let text = serde_json::to_string(&state).unwrap();
        let parsed: FilterState = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_operator_wire_tags() {
        assert_eq!(serde_json::to_string(&Operator::Equals).unwrap(), "\"==\"");
        assert_eq!(
            serde_json::to_string(&Operator::ContainsSubstring).unwrap(),
            "\"%>\""
        );
        assert_eq!(
            serde_json::to_string(&Operator::ContainsWord).unwrap(),
            "\"~>\""
        );
    }

    #[test]
    fn test_search_field_tags_roundtrip() {
        for field in [
            SearchField::Title,
            SearchField::Employee,
            SearchField::Description,
        ] {
            assert_eq!(SearchField::parse(field.query_key()), Some(field));
        }
        assert_eq!(SearchField::parse("grades"), None);
    }

    #[test]
    fn test_categorical_field_parse() {
        for field in CategoricalField::ALL {
            let tag = match field {
                CategoricalField::StudyLevel => "study_level",
                CategoricalField::Block => "block",
                CategoricalField::ScheduleGroup => "schedule_group",
                CategoricalField::ExamType => "exam_type",
                CategoricalField::Department => "department",
            };
            assert_eq!(CategoricalField::parse(tag), Some(field));
        }
        assert_eq!(CategoricalField::parse("ects"), None);
    }

    #[test]
    fn test_default_state_is_empty() {
        let state = FilterState::default();
        assert!(state.searches.is_empty());
        for field in CategoricalField::ALL {
            assert!(state.selected(field).is_empty());
        }
    }
}
