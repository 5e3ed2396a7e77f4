//! HTTPRouteGroup commands

use crate::cli::{DeleteCommands, GetCommands};
use crate::meshclient::MeshClient;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use meshctl_common::{HttpMatch, HttpRouteGroup, MeshObject};
use tabled::Tabled;

#[derive(Tabled)]
struct RouteGroupRow {
    name: String,
    matches: usize,
    paths: String,
    methods: String,
}

fn match_path(m: &HttpMatch) -> Option<&str> {
    m.path.as_deref().or(m.path_regex.as_deref())
}

impl From<&HttpRouteGroup> for RouteGroupRow {
    fn from(group: &HttpRouteGroup) -> Self {
        let paths: Vec<&str> = group.matches.iter().filter_map(match_path).collect();

        let mut methods: Vec<&str> = group
            .matches
            .iter()
            .flat_map(|m| m.methods.iter().map(String::as_str))
            .collect();
        methods.sort_unstable();
        methods.dedup();

        Self {
            name: group.name.clone(),
            matches: group.matches.len(),
            paths: if paths.is_empty() { "-".to_string() } else { paths.join(",") },
            methods: if methods.is_empty() { "*".to_string() } else { methods.join(",") },
        }
    }
}

pub async fn handle_get_command(
    command: GetCommands,
    mesh: &MeshClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        GetCommands::HttpRouteGroup { name: Some(name) } => {
            let group = mesh.http_route_groups().get(&name).await?;

            match format {
                OutputFormat::Table => output::print_table(vec![RouteGroupRow::from(&group)]),
                OutputFormat::Json => output::print_json(&group.to_resource())?,
                OutputFormat::Yaml => output::print_yaml(&group.to_resource())?,
            }
        }

        GetCommands::HttpRouteGroup { name: None } => {
            let groups = mesh.http_route_groups().list().await?;

            let rows: Vec<RouteGroupRow> = groups.iter().map(RouteGroupRow::from).collect();
            let resources: Vec<_> = groups.iter().map(HttpRouteGroup::to_resource).collect();
            output::print_output(rows, &resources, format)?;
        }
    }

    Ok(())
}

pub async fn handle_delete_command(command: DeleteCommands, mesh: &MeshClient) -> Result<()> {
    match command {
        DeleteCommands::HttpRouteGroup { name } => {
            mesh.http_route_groups().delete(&name).await?;
            output::print_deleted(HttpRouteGroup::KIND, &name);
        }
    }

    Ok(())
}
