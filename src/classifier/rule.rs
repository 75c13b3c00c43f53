//! Deterministic substring-rule classifier: the offline stand-in for an
//! LLM-backed one, used by the console REPL's default configuration and
//! by every integration test. Rules are tried in declaration order and
//! the first whose key appears anywhere in the input wins, provided its
//! mapped intent is actually one of the declared candidates.

use super::{Classifier, UNKNOWN};

pub struct RuleClassifier {
    rules: Vec<(&'static str, &'static str)>,
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self {
            rules: vec![
                ("办理流量包", "办理流量包"),
                ("办理流量", "办理流量包"),
                ("买流量", "办理流量包"),
                ("查流量", "查询流量"),
                ("查询流量", "查询流量"),
                ("流量", "查询流量"),
                ("查话费", "查询话费"),
                ("话费", "查询话费"),
                ("充值", "充值缴费"),
                ("宽带", "宽带故障"),
                ("修", "宽带故障"),
                ("人工", "人工服务"),
                ("确认", "确认"),
                ("是", "确认"),
                ("拒绝", "拒绝"),
                ("否", "拒绝"),
                ("没有", "没有了"),
                ("结束", "结束"),
                ("还有", "还有"),
                ("修改姓名", "修改姓名"),
                ("修改邮箱", "修改邮箱"),
                ("修改住址", "修改住址"),
                ("退出", "退出"),
            ],
        }
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for RuleClassifier {
    fn detect_intent(&self, input: &str, candidates: &[String]) -> String {
        for (key, intent) in &self.rules {
            if input.contains(key) && candidates.iter().any(|c| c == intent) {
                return intent.to_string();
            }
        }
        UNKNOWN.to_string()
    }
}
