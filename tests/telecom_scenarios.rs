//! End-to-end scenarios against the bundled `customer_server.bot` and
//! `profile_manager.bot` demo scripts, run against a freshly seeded SQLite
//! database with the rule-based classifier — no live LLM or display
//! required.

use botflow::adapter::ConsoleLikeTestAdapter;
use botflow::classifier::RuleClassifier;
use botflow::functions::FunctionRegistry;
use botflow::runtime::Engine;
use botflow::store::{SqliteStore, Store};

const SCHEMA: &str = "
    CREATE TABLE users (
        phone TEXT PRIMARY KEY,
        name TEXT,
        balance REAL,
        data_left REAL,
        package_name TEXT,
        broadband_status INTEGER,
        id_card TEXT,
        email TEXT,
        address TEXT,
        city TEXT
    );
    INSERT INTO users VALUES ('13800138000', '测试1', 1200.50, 50.0, '5G畅享套餐', 0, '4512', 'test1@example.com', '北京市海淀区科技园', '北京');
    INSERT INTO users VALUES ('13900139000', '测试2', 5.00, 0.0, '4G基础套餐', 0, '8821', 'test2@test.com', '上海市浦东新区', '上海');
    INSERT INTO users VALUES ('18900189000', '测试3', 150.00, 10.0, '家庭融合套餐', 1, '9090', 'test3@isp.net', '广州市天河区', '广州');
    INSERT INTO users VALUES ('13600136000', '测试4', 10.00, 2.0, '学生校园卡', 0, '6666', 'test4@campus.edu', '武汉市洪山区', '武汉');
";

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.execute_batch(SCHEMA).unwrap();
    store
}

fn run_bot(script: &str, bot: &str, inputs: Vec<&str>, store: &SqliteStore) -> ConsoleLikeTestAdapter {
    let table = botflow::parser::compile(script).unwrap();
    let flow = table.get(bot).unwrap_or_else(|| panic!("bot {bot} not found"));
    let classifier = RuleClassifier::new();
    let functions = FunctionRegistry::new();
    let adapter = ConsoleLikeTestAdapter::new(inputs);

    let engine = Engine::new(Some(store as &dyn Store), &functions, Some(&classifier), &adapter);
    let _ = botflow::runtime::run(flow, &engine);
    adapter
}

fn balance_of(store: &SqliteStore, phone: &str) -> f64 {
    let sql = format!("SELECT balance FROM users WHERE phone = '{phone}'");
    store.fetch_scalar(&sql, &[]).unwrap().unwrap().parse().unwrap()
}

const CUSTOMER_SERVER_BOT: &str = include_str!("../demos/customer_server.bot");
const PROFILE_MANAGER_BOT: &str = include_str!("../demos/profile_manager.bot");

#[test]
fn scenario_1_topup_then_buy() {
    let store = seeded_store();
    let adapter = run_bot(
        CUSTOMER_SERVER_BOT,
        "custBot",
        vec!["13900139000", "充值", "100", "还有", "办理流量包", "没有了"],
        &store,
    );
    let output = adapter.sent().join("\n");
    assert!(output.contains("充值成功"), "output: {output}");
    assert!(output.contains("办理成功"), "output: {output}");
    assert!((balance_of(&store, "13900139000") - 95.0).abs() < 0.01);
}

#[test]
fn scenario_2_exact_balance_boundary() {
    let store = seeded_store();
    let adapter = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["13600136000", "办理流量包", "没有了"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("办理成功"));
    assert!((balance_of(&store, "13600136000") - 0.0).abs() < 0.01);
}

#[test]
fn scenario_3_sql_injection_attempt() {
    let store = seeded_store();
    let adapter = run_bot(PROFILE_MANAGER_BOT, "profBot", vec!["13800138000", "' OR '1'='1"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("身份验证失败"));
    assert!(!output.contains("档案信息"));
}

#[test]
fn scenario_4_broadband_fault_branch() {
    let store = seeded_store();
    let adapter = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["18900189000", "宽带故障", "没有了"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("线路信号异常"));
    assert!(output.contains("错误代码: 1"));
}

#[test]
fn scenario_5_retry_loop_on_unknown_phone() {
    let store = seeded_store();
    let adapter = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["110", "13800138000", "没有了"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("未查询到号码"));
    assert!(output.contains("身份验证通过"));
    assert!(output.contains("尊贵的 5G畅享套餐 用户"));
}

#[test]
fn scenario_6_unknown_intent_fallback() {
    let store = seeded_store();
    let adapter = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["13800138000", "我想吃火锅", "查话费", "没有了"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("抱歉，我没听懂"));
    assert!(output.contains("账户余额"));
}

#[test]
fn insufficient_balance_blocks_purchase_without_charging() {
    let store = seeded_store();
    let adapter = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["13900139000", "办理流量包", "拒绝", "没有了"], &store);
    let output = adapter.sent().join("\n");
    assert!(output.contains("余额不足"));
    assert!((balance_of(&store, "13900139000") - 5.0).abs() < 0.01);
}

#[test]
fn profile_update_persists_across_sessions() {
    let store = seeded_store();
    run_bot(
        PROFILE_MANAGER_BOT,
        "profBot",
        vec!["13800138000", "4512", "修改邮箱", "new_email@test.com", "退出"],
        &store,
    );
    let email = store
        .fetch_scalar("SELECT email FROM users WHERE phone = '13800138000'", &[])
        .unwrap()
        .unwrap();
    assert_eq!(email, "new_email@test.com");

    let adapter = run_bot(PROFILE_MANAGER_BOT, "profBot", vec!["13800138000", "4512", "退出"], &store);
    assert!(adapter.sent().join("\n").contains("new_email@test.com"));
}

#[test]
fn context_isolation_across_sequential_sessions() {
    let store = seeded_store();

    let adapter_a = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["13900139000", "办理流量包", "拒绝", "没有了"], &store);
    let adapter_b = run_bot(CUSTOMER_SERVER_BOT, "custBot", vec!["13800138000", "办理流量包", "没有了"], &store);

    let output_a = adapter_a.sent().join("\n");
    let output_b = adapter_b.sent().join("\n");

    assert!(output_a.contains("余额不足"));
    assert!(output_b.contains("办理成功"));
    assert!(!output_a.contains("1200.50"));
    assert!(!output_a.contains("测试1"));
}
