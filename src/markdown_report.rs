// File: markdown_report.rs
// Description: 生成项目配置的 Markdown 摘要表格，供 `--list` 输出。

use crate::loader::LoadOutcome;
use crate::project_list::ProjectConfigList;

pub fn render_summary(projects: &ProjectConfigList) -> String {
    let mut markdown = String::new();
    markdown.push_str("# Bot projects\n\n");
    markdown.push_str("| # | label | name | board | workspace | PTS servers | superguard | repos | schedule |\n");
    markdown.push_str("|---|---|---|---|---|---|---|---|---|\n");
    for (index, project) in projects.iter().enumerate() {
        let servers = project
            .auto_pts
            .pts_endpoints()
            .map(|(srv, srv_port, _, cli_port)| format!("{srv}:{srv_port} ({cli_port})"))
            .collect::<Vec<_>>()
            .join(", ");
        let repos = project.git.keys().cloned().collect::<Vec<_>>().join(", ");
        let schedule = project
            .scheduler
            .as_ref()
            .map(|s| {
                s.triggers()
                    .map(|(day, at)| format!("{day} {at}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_else(|| "-".to_string());
        markdown.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} min | {} | {} |\n",
            index,
            project.label.as_deref().unwrap_or("-"),
            project.name,
            project.auto_pts.board,
            project.auto_pts.workspace,
            servers,
            project.auto_pts.superguard,
            repos,
            schedule
        ));
    }
    markdown
}

/// 宽松加载时附上被跳过的记录
pub fn render_outcome(outcome: &LoadOutcome) -> String {
    let mut markdown = render_summary(&outcome.projects);
    if !outcome.rejected.is_empty() {
        markdown.push_str("\n## Skipped records\n\n");
        for error in &outcome.rejected {
            markdown.push_str(&format!("- {error}\n"));
        }
    }
    markdown
}
