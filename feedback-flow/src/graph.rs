use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{
    context::Context,
    error::{FlowError, Result},
    task::{NextAction, Task},
};

/// Default upper bound on task runs in one execution.
pub const DEFAULT_MAX_STEPS: usize = 32;

/// Type alias for edge condition functions
pub type EdgeCondition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Edge between tasks in the graph
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub condition: Option<EdgeCondition>,
}

/// A graph of tasks that can be executed
pub struct Graph {
    pub id: String,
    tasks: HashMap<String, Arc<dyn Task>>,
    edges: Vec<Edge>,
    start_task_id: Option<String>,
    max_steps: usize,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: HashMap::new(),
            edges: Vec::new(),
            start_task_id: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Run the graph from its start task until a task ends it, a `Continue`
    /// has nowhere to go, or the step limit is reached.
    pub async fn execute(&self, context: Context) -> Result<ExecutionResult> {
        let mut current = self.start_task_id.clone().ok_or(FlowError::NoStartTask)?;
        let mut visited = Vec::new();

        loop {
            if visited.len() >= self.max_steps {
                return Err(FlowError::StepLimitExceeded(self.max_steps));
            }

            let task = self
                .get_task(&current)
                .ok_or_else(|| FlowError::TaskNotFound(current.clone()))?;

            debug!(graph_id = %self.id, task_id = %current, "running task");
            let result = task.run(context.clone()).await?;
            visited.push(current.clone());

            let next = match result.next_action {
                NextAction::End => None,
                NextAction::Continue => self.find_next_task(&current, &context),
                NextAction::GoTo(target) => {
                    if !self.tasks.contains_key(&target) {
                        return Err(FlowError::TaskNotFound(target));
                    }
                    Some(target)
                }
            };

            match next {
                Some(next) => current = next,
                None => {
                    debug!(graph_id = %self.id, steps = visited.len(), "execution finished");
                    return Ok(ExecutionResult {
                        response: result.response,
                        visited,
                    });
                }
            }
        }
    }

    /// Find the next task based on edges and conditions.
    /// Edges are checked in insertion order and the first match wins.
    pub fn find_next_task(&self, current_task_id: &str, context: &Context) -> Option<String> {
        self.edges
            .iter()
            .filter(|edge| edge.from == current_task_id)
            .find(|edge| edge.condition.as_ref().is_none_or(|condition| condition(context)))
            .map(|edge| edge.to.clone())
    }

    /// Get the start task ID
    pub fn start_task_id(&self) -> Option<&str> {
        self.start_task_id.as_deref()
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(task_id).cloned()
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
        }
    }

    /// Add a task; the first one added becomes the start task.
    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        let task_id = task.id().to_string();
        if self.graph.tasks.is_empty() {
            self.graph.start_task_id = Some(task_id.clone());
        }
        self.graph.tasks.insert(task_id, task);
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.graph.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            condition: None,
        });
        self
    }

    pub fn add_conditional_edge<F>(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: F,
    ) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.graph.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            condition: Some(Arc::new(condition)),
        });
        self
    }

    /// Ignored when no task with that id has been added.
    pub fn set_start_task(mut self, task_id: impl Into<String>) -> Self {
        let task_id = task_id.into();
        if self.graph.tasks.contains_key(&task_id) {
            self.graph.start_task_id = Some(task_id);
        }
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.graph.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Outcome of a completed graph execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Response of the last task that ran
    pub response: Option<String>,
    /// Task ids in the order they ran
    pub visited: Vec<String>,
}
