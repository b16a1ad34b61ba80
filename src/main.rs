//! crm-kb: CLI da base de conhecimento do CRM
//!
//! Opera sobre um conjunto (`kb_set`):
//! - Lista e cria definições de campo
//! - Lista entries e edita o valor de um campo (create/update)
//! - Acompanha o conjunto com refresh periódico (`watch`)

use clap::{Parser, Subcommand};
use serde_json::json;

use crm_knowledge_base::config::Settings;
use crm_knowledge_base::services::{
    control_summary, entry_summary, field_summary, parse_field_type, KnowledgeBaseService,
};
use crm_knowledge_base::utils::logging::*;
use crm_knowledge_base::utils::AppResult;
use knowledge_base::types::{EntryId, SetId};
use knowledge_base::{spawn_polling, FilePreview, ViewScope};

/// CLI da base de conhecimento do CRM
#[derive(Parser)]
#[command(name = "crm-kb")]
#[command(version)]
#[command(about = "CLI para campos e entries da base de conhecimento do CRM", long_about = None)]
struct Cli {
    /// URL base da API (sobrepõe config/ e KB_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Token de acesso (sobrepõe KB_API_TOKEN)
    #[arg(short = 't', long, global = true)]
    token: Option<String>,

    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Comando a executar
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("Formato desconhecido: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Lista as definições de campo de um conjunto
    Fields {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,
    },

    /// Cria uma definição de campo
    CreateField {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,

        /// Nome do campo
        #[arg(short = 'n', long)]
        name: String,

        /// Tipo (text, number, boolean, date, url, json, choice)
        #[arg(long, default_value = "text")]
        field_type: String,

        /// Campo obrigatório
        #[arg(short = 'r', long)]
        required: bool,

        /// Opções do campo de escolha (separadas por vírgula)
        #[arg(long)]
        options: Option<String>,
    },

    /// Lista as entries de um conjunto com os valores normalizados
    Entries {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,
    },

    /// Define o valor de um campo (cria a entry se --entry não for informado)
    SetValue {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,

        /// ID ou nome do campo
        #[arg(short = 'f', long)]
        field: String,

        /// ID da entry existente
        #[arg(short = 'e', long)]
        entry: Option<EntryId>,

        /// Valor bruto, como digitado no controle
        #[arg(long)]
        value: String,
    },

    /// Limpa o valor de um campo
    ClearValue {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,

        /// ID ou nome do campo
        #[arg(short = 'f', long)]
        field: String,

        /// ID da entry existente
        #[arg(short = 'e', long)]
        entry: Option<EntryId>,
    },

    /// Mostra o controle de entrada de um campo
    Render {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,

        /// ID ou nome do campo
        #[arg(short = 'f', long)]
        field: String,

        /// ID da entry existente
        #[arg(short = 'e', long)]
        entry: Option<EntryId>,
    },

    /// Acompanha as entries de um conjunto até Ctrl+C
    Watch {
        /// ID do conjunto
        #[arg(short = 's', long)]
        kb_set: SetId,

        /// Intervalo em segundos (padrão: polling.interval_secs)
        #[arg(short = 'i', long)]
        interval: Option<u64>,
    },

    /// Classifica a pré-visualização de um arquivo pela URL
    Preview {
        /// URL ou caminho do arquivo
        url: String,
    },
}

/// Estrutura para resposta padronizada
#[derive(serde::Serialize)]
struct CliResponse {
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

impl CliResponse {
    fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env antes do tracing para que RUST_LOG do arquivo seja respeitado
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    init_tracing(cli.verbose);

    if dotenv_loaded {
        tracing::debug!("✅ Arquivo .env carregado");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let output_format = cli.output.clone();

    match execute_command(&cli).await {
        Ok(response) => {
            output_response(response, &output_format);
        }
        Err(e) => {
            let exit_code = e.exit_code();
            output_response(CliResponse::error(e.to_string()), &output_format);
            std::process::exit(exit_code);
        }
    }
}

fn load_settings(cli: &Cli) -> AppResult<Settings> {
    let mut settings = Settings::new()?;

    if let Some(api_url) = &cli.api_url {
        settings.api.base_url = api_url.clone();
    }
    if let Some(token) = &cli.token {
        settings.api.token = Some(token.clone());
    }

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));
    Ok(settings)
}

/// Carrega a configuração e monta o serviço (comandos que falam com a API)
fn connect(cli: &Cli) -> AppResult<(Settings, KnowledgeBaseService)> {
    let settings = load_settings(cli)?;
    let service = KnowledgeBaseService::from_settings(&settings)?;
    Ok((settings, service))
}

async fn execute_command(cli: &Cli) -> AppResult<CliResponse> {
    match &cli.command {
        Commands::Fields { kb_set } => {
            let (_, service) = connect(cli)?;
            let fields = service.fields(*kb_set).await?;
            let summaries: Vec<_> = fields.iter().map(field_summary).collect();
            Ok(CliResponse::success(json!({
                "kb_set": kb_set,
                "fields": summaries,
                "count": fields.len(),
            })))
        }

        Commands::CreateField { kb_set, name, field_type, required, options } => {
            let field_type = parse_field_type(field_type)?;
            let (_, service) = connect(cli)?;
            let field = service
                .create_field(*kb_set, name, field_type, *required, options.as_deref())
                .await?;
            Ok(CliResponse::success(json!({
                "field": field,
                "message": "Campo criado com sucesso!",
            })))
        }

        Commands::Entries { kb_set } => {
            let (_, service) = connect(cli)?;
            let fields = service.fields(*kb_set).await?;
            let entries = service.entries(*kb_set).await?;
            let summaries: Vec<_> = entries.iter().map(|e| entry_summary(e, &fields)).collect();
            Ok(CliResponse::success(json!({
                "kb_set": kb_set,
                "entries": summaries,
                "count": summaries.len(),
            })))
        }

        Commands::SetValue { kb_set, field, entry, value } => {
            let (_, service) = connect(cli)?;
            let saved = service.set_value(*kb_set, field, *entry, value).await?;
            Ok(CliResponse::success(json!({
                "entry": saved,
                "message": "Valor salvo com sucesso!",
            })))
        }

        Commands::ClearValue { kb_set, field, entry } => {
            let (_, service) = connect(cli)?;
            let saved = service.clear_value(*kb_set, field, *entry).await?;
            Ok(CliResponse::success(json!({
                "entry": saved,
                "message": "Valor removido",
            })))
        }

        Commands::Render { kb_set, field, entry } => {
            let (_, service) = connect(cli)?;
            let definition = service.find_field(*kb_set, field).await?;
            let editor = service.open_editor(*kb_set, definition, *entry).await?;
            Ok(CliResponse::success(json!({
                "field": editor.field(),
                "value": editor.value(),
                "control": control_summary(&editor.control()),
            })))
        }

        Commands::Watch { kb_set, interval } => {
            let (settings, service) = connect(cli)?;
            let period = interval
                .map(std::time::Duration::from_secs)
                .map(knowledge_base::scope::clamp_interval)
                .unwrap_or_else(|| settings.poll_interval());
            watch_entries(&service, *kb_set, period, &cli.output).await
        }

        // Classificação local, não precisa de configuração
        Commands::Preview { url } => Ok(CliResponse::success(json!(FilePreview::for_url(url)))),
    }
}

/// Recarrega as entries a cada `period` até Ctrl+C
async fn watch_entries(
    service: &KnowledgeBaseService,
    kb_set: SetId,
    period: std::time::Duration,
    format: &OutputFormat,
) -> AppResult<CliResponse> {
    let fields = service.fields(kb_set).await?;
    log_info(&format!(
        "👀 Acompanhando conjunto {} a cada {}s (Ctrl+C para sair)",
        kb_set,
        period.as_secs()
    ));

    let scope = ViewScope::new();
    let client = service.client().clone();
    let format = format.clone();

    let handle = spawn_polling(period, scope.child_token(), move || {
        let client = client.clone();
        let fields = fields.clone();
        let format = format.clone();
        async move {
            let entries = client.list_entries(kb_set).await?;
            let summaries: Vec<_> = entries.iter().map(|e| entry_summary(e, &fields)).collect();
            let snapshot = json!({
                "kb_set": kb_set,
                "at": chrono::Utc::now().to_rfc3339(),
                "entries": summaries,
            });
            output_response(CliResponse::success(snapshot), &format);
            Ok(())
        }
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        log_warning(&format!("Falha ao aguardar Ctrl+C: {}", e));
    }

    // Encerrar o escopo cancela o refresh em andamento
    scope.cancel();
    let _ = handle.await;

    Ok(CliResponse::success(json!({
        "kb_set": kb_set,
        "message": "Acompanhamento encerrado",
    })))
}

fn output_response(response: CliResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(&response) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
        },
        OutputFormat::Pretty => {
            if response.success {
                if let Some(data) = response.data {
                    println!("✅ Sucesso!");
                    match serde_json::to_string_pretty(&data) {
                        Ok(text) => println!("{}", text),
                        Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
                    }
                }
            } else if let Some(error) = response.error {
                eprintln!("❌ Erro: {}", error);
            }
        }
    }
}
