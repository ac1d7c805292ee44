//! Deploy job construction
//!
//! A deploy job checks out the commit branch, pins the destination's
//! manifest to the current commit, pushes that change, then upserts and
//! syncs the application through the controller CLI.

use rollgate_types::{Defaults, Job, ResolvedSettings, Step};

pub const ENV_APPLICATION_FILE: &str = "ARGOCD_APPLICATION_FILE";
pub const ENV_COMMIT_MESSAGE: &str = "GIT_COMMIT_MESSAGE";

const CHECKOUT_ACTION: &str = "actions/checkout@v4";
const SETUP_YQ_ACTION: &str = "frenck/action-setup-yq@v1";
const PUSH_ACTION: &str = "actions-js/push@v1.5";

/// Everything a deploy job needs to know about its destination
#[derive(Debug, Clone, Copy)]
pub struct DeployJobInput<'a> {
    /// Derived resource name; also the application name
    pub resource_name: &'a str,
    /// Canonical cluster identity, used in the commit message
    pub identity: &'a str,
    pub commit_branch: &'a str,
    /// Repository-relative path of the destination's manifest
    pub manifest_path: &'a str,
    pub settings: &'a ResolvedSettings,
    pub runs_on: &'a [String],
}

/// Render a command with one argument per continuation line
fn command(program: &str, args: &[String]) -> String {
    let mut out = program.to_string();
    for arg in args {
        out.push_str(" \\\n  ");
        out.push_str(arg);
    }
    out.push('\n');
    out
}

/// Flags that point the controller CLI at a local kube context
fn context_flags(settings: &ResolvedSettings) -> Vec<String> {
    match settings.kube_context.value.as_deref() {
        Some(context) if !context.is_empty() => {
            vec!["--core".to_string(), format!("--kube-context {}", context)]
        }
        _ => Vec::new(),
    }
}

fn checkout_step(branch: &str) -> Step {
    Step::uses("checkout", CHECKOUT_ACTION)
        .with_input("ref", branch)
        .with_input("persist-credentials", false)
        .with_input("fetch-depth", 0)
}

fn git_config_step() -> Step {
    Step::run(
        "git-config",
        "git config --global user.name '${{ github.actor }}'\n\
         git config --global user.email '${{ github.actor }}@users.noreply.github.com'\n",
    )
}

fn update_revision_step() -> Step {
    Step::run(
        "update-application-yaml",
        format!(
            "yq e -i '.spec.source.targetRevision = \"${{{{ github.sha }}}}\"' \"${{{}}}\"\n",
            ENV_APPLICATION_FILE
        ),
    )
}

fn commit_step() -> Step {
    Step::run(
        "git-add-commit",
        format!(
            "git add \"${{{file}}}\"\n\
             if git diff-index --quiet HEAD -- 2>/dev/null; then\n\
             \x20 echo \"No changes to commit\"\n\
             else\n\
             \x20 git commit -m \"${{{message}}}\"\n\
             fi\n",
            file = ENV_APPLICATION_FILE,
            message = ENV_COMMIT_MESSAGE
        ),
    )
}

fn push_step(branch: &str) -> Step {
    Step::uses("git-push", PUSH_ACTION)
        .with_input("github_token", "${{ secrets.GITHUB_TOKEN }}")
        .with_input("branch", branch)
}

/// Controller CLI steps: login (unless running against a kube context),
/// upsert, then sync
fn controller_steps(resource_name: &str, settings: &ResolvedSettings) -> Vec<Step> {
    let context = context_flags(settings);
    let mut steps = Vec::with_capacity(3);

    if context.is_empty() {
        let mut args = vec![settings.hostname.value.clone()];
        args.extend(settings.login_args.value.iter().cloned());
        steps.push(Step::run("argocd-login", command("argocd login", &args)));
    }

    let mut upsert = context.clone();
    upsert.extend(settings.extra_args.value.iter().cloned());
    upsert.push("--upsert".to_string());
    upsert.push(format!("--file \"${{{}}}\"", ENV_APPLICATION_FILE));
    steps.push(Step::run("argocd-upsert", command("argocd app create", &upsert)));

    let mut sync = vec![resource_name.to_string()];
    sync.extend(context);
    sync.extend(settings.extra_args.value.iter().cloned());
    sync.push(format!("--timeout {}", settings.sync_timeout_seconds.value));
    sync.push(format!("--retry-limit {}", settings.retry_limit.value));
    steps.push(Step::run("argocd-sync", command("argocd app sync", &sync)));

    steps
}

/// Build the deploy job for one destination
pub fn deploy_job(input: DeployJobInput<'_>) -> Job {
    let settings = input.settings;

    let mut steps = vec![checkout_step(input.commit_branch)];
    steps.extend(settings.pre_deploy_steps.value.iter().cloned());
    steps.push(git_config_step());
    steps.push(Step::uses("setup-yq", SETUP_YQ_ACTION));
    steps.push(update_revision_step());
    steps.push(commit_step());
    steps.push(push_step(input.commit_branch));
    steps.extend(controller_steps(input.resource_name, settings));
    steps.extend(settings.post_deploy_steps.value.iter().cloned());

    let mut env = settings.env.value.clone();
    env.insert(ENV_APPLICATION_FILE.to_string(), input.manifest_path.to_string());
    env.insert(
        ENV_COMMIT_MESSAGE.to_string(),
        format!("feat: 🚀 deploy to {}", input.identity),
    );

    Job {
        name: Some(format!("deploy-{}", input.resource_name)),
        runs_on: input.runs_on.to_vec(),
        defaults: Some(Defaults::bash()),
        env,
        steps,
        ..Default::default()
    }
}
