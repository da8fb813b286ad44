// accrete/examples/generate_post.rs

use accrete::{reducers, AccreteResult, FieldSchema, Route, Schema, StateCell, StateSnapshot, Update};
use tracing::info;

// 1. Define the step identifiers the routing field will carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Step {
  GeneratePost,
  CondensePost,
  SchedulePost,
}

const MAX_CONDENSE_PASSES: u32 = 3;
const POST_LENGTH_LIMIT: usize = 60;

fn main() -> AccreteResult<()> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Generate-Post Workflow Example ---");

  // 2. Declare the accumulated-state shape once, up front. Each field's
  //    merge policy is independent of which step produces the update.
  let mut b = Schema::builder("generate_post");
  let links = b.field("links", FieldSchema::<Vec<String>>::overwrite())?;
  let report = b.field("report", FieldSchema::<String>::overwrite())?;
  let page_contents = b.field("page_contents", reducers::append::<String>())?;
  let relevant_links = b.field("relevant_links", reducers::union::<String>())?;
  let post = b.field("post", FieldSchema::<String>::overwrite())?;
  let next = b.field("next", FieldSchema::<Route<Step>>::overwrite())?;
  let condense_count = b.field("condense_count", reducers::counter::<u32>())?;
  let schema = b.build();

  // 3. Seed a run with its input links and wrap the state in a cell
  let seed = Update::new().set(
    &links,
    vec!["https://example.com/launch".to_string(), "https://example.com/docs".to_string()],
  );
  let cell = StateCell::new(StateSnapshot::init_with(&schema, &seed)?);

  // 4. Drive the run: each step emits a partial update, the orchestrator
  //    reads the routing field to pick the next step
  let mut route = Route::Step(Step::GeneratePost);
  while let Some(step) = route.step().copied() {
    let state = cell.current();
    let update = match step {
      Step::GeneratePost => {
        // Pretend we fetched the pages and wrote a report + first draft.
        Update::new()
          .set(&page_contents, vec!["Launch page content".to_string(), "Docs page content".to_string()])
          .set(&relevant_links, vec!["https://example.com/docs".to_string(), "https://example.com/blog".to_string()])
          .set(&report, "Two pages summarized.".to_string())
          .set(
            &post,
            "A very long first draft that clearly will not fit the length limit we set".to_string(),
          )
          .set(&next, Route::Step(Step::CondensePost))
      }
      Step::CondensePost => {
        let passes = state.get(&condense_count).copied().unwrap_or(0);
        let draft = state.get(&post).cloned().unwrap_or_default();
        let condensed: String = draft.chars().take(draft.chars().count() * 3 / 4).collect();
        let done = condensed.len() <= POST_LENGTH_LIMIT || passes + 1 >= MAX_CONDENSE_PASSES;
        info!(pass = passes + 1, len = condensed.len(), "condensed draft");
        Update::new()
          .set(&post, condensed)
          .set(&condense_count, passes + 1)
          .set(
            &next,
            if done {
              Route::Step(Step::SchedulePost)
            } else {
              Route::Step(Step::CondensePost)
            },
          )
      }
      Step::SchedulePost => {
        info!(post = %state.get(&post).unwrap(), "scheduling post");
        Update::new().set(&next, Route::Done)
      }
    };
    let merged = cell.apply(&update)?;
    route = merged.get(&next).copied().unwrap_or(Route::Done);
  }

  // 5. Inspect the finished run; every intermediate state is still there
  let final_state = cell.current();
  info!("Run finished after {} merges.", cell.history_len() - 1);
  info!("Final post: {}", final_state.get(&post).unwrap());
  info!("Relevant links: {:?}", final_state.get(&relevant_links).unwrap());
  info!("Condense passes: {}", final_state.get(&condense_count).unwrap());

  assert!(final_state.get(&condense_count).unwrap() <= &MAX_CONDENSE_PASSES);
  assert!(final_state.get(&next).unwrap().is_done());

  Ok(())
}
