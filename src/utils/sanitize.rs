//! 文本清理
//!
//! 去掉站点返回内容中的 HTML 标签和 `[tex]` 标记。

use regex::Regex;
use std::sync::LazyLock;

static RE_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("换行正则无效"));

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("标签正则无效"));

static RE_TEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\[(?/)]+tex\]").expect("tex 正则无效"));

static RE_GT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&gt;").expect("实体正则无效"));

/// 清理一段内容
///
/// 依次执行：换行标签 → `\n`，去掉其余标签，去掉 `[tex]` / `[/tex]`，`&gt;` → `>`。
/// 每一步只会缩短文本，重复执行直到结果不再变化，因此 `clean(clean(x)) == clean(x)`。
pub fn clean(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let text = RE_LINE_BREAK.replace_all(text, "\n");
    let text = RE_TAG.replace_all(&text, "");
    let text = RE_TEX.replace_all(&text, "");
    RE_GT.replace_all(&text, ">").into_owned()
}
