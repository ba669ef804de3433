#![forbid(unsafe_code)]

//! Reactive trigger tables.
//!
//! Each page behavior that re-measures (the two text fitters and the timeline
//! width sync) declares the events it reacts to as a list of [`Reaction`]s:
//! a trigger source, the task it causes, and how repeated triggers coalesce.
//! The [`Scheduler`] turns incoming triggers into work using that table and a
//! [`FrameCoalescer`], so the debounce behavior can be tested without a
//! browser.

use crate::frame::{FrameCoalescer, FrameKinds};

/// Something that happened on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// Behaviors were just mounted.
    Startup,
    /// The window `resize` event.
    WindowResize,
    /// The headline measure element changed size.
    HeadlineResize,
    /// The subhead box changed size.
    SubheadResize,
    /// All web fonts finished loading.
    FontsReady,
    /// The tab became visible again.
    VisibilityRestored,
    /// Zero-delay timer, used when the font loading API is missing.
    Deferred,
}

/// Work a trigger can cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    FitHeadline,
    FitSubhead,
    SyncTimelineWidth,
}

impl Task {
    /// All tasks, in the order they run within a frame.
    pub const ALL: [Task; 3] = [Task::FitHeadline, Task::FitSubhead, Task::SyncTimelineWidth];

    /// Frame-coalescing slot for this task.
    #[must_use]
    pub const fn frame_kind(self) -> FrameKinds {
        match self {
            Self::FitHeadline => FrameKinds::HEADLINE_FIT,
            Self::FitSubhead => FrameKinds::SUBHEAD_FIT,
            Self::SyncTimelineWidth => FrameKinds::TIMELINE_WIDTH,
        }
    }

    /// Expand a set of frame kinds into tasks, in run order.
    #[must_use]
    pub fn from_kinds(kinds: FrameKinds) -> Vec<Task> {
        Self::ALL
            .into_iter()
            .filter(|task| kinds.contains(task.frame_kind()))
            .collect()
    }
}

/// How repeated triggers for the same task are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coalescing {
    /// Run synchronously on every trigger.
    Immediate,
    /// Run once on the next animation frame, however many triggers arrive.
    NextFrame,
}

/// Platform features that change which triggers are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCaps {
    /// Element-level resize observation is available.
    pub resize_observer: bool,
    /// The font loading API (`document.fonts.ready`) is available.
    pub font_loading: bool,
}

impl PlatformCaps {
    /// Every capability present.
    #[must_use]
    pub const fn modern() -> Self {
        Self {
            resize_observer: true,
            font_loading: true,
        }
    }

    /// No optional capability present.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            resize_observer: false,
            font_loading: false,
        }
    }
}

impl Default for PlatformCaps {
    fn default() -> Self {
        Self::modern()
    }
}

/// One `(trigger, task, coalescing)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reaction {
    pub source: TriggerSource,
    pub task: Task,
    pub coalescing: Coalescing,
}

impl Reaction {
    #[must_use]
    pub const fn new(source: TriggerSource, task: Task, coalescing: Coalescing) -> Self {
        Self {
            source,
            task,
            coalescing,
        }
    }
}

/// The full set of reactions for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionTable {
    reactions: Vec<Reaction>,
}

impl ReactionTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard reactions for the page, degraded to what `caps` supports.
    ///
    /// Fitters re-run when their box resizes (falling back to window resize),
    /// when fonts load (falling back to a zero-delay timer), when the tab
    /// becomes visible, and at startup. The timeline width sync runs at
    /// startup, on window resize and when fonts load; it always waits for a
    /// frame.
    #[must_use]
    pub fn standard(caps: PlatformCaps) -> Self {
        use Coalescing::{Immediate, NextFrame};

        let mut table = Self::new();
        for (task, box_resize) in [
            (Task::FitHeadline, TriggerSource::HeadlineResize),
            (Task::FitSubhead, TriggerSource::SubheadResize),
        ] {
            let resize = if caps.resize_observer {
                box_resize
            } else {
                TriggerSource::WindowResize
            };
            let fonts = if caps.font_loading {
                TriggerSource::FontsReady
            } else {
                TriggerSource::Deferred
            };
            table.push(Reaction::new(TriggerSource::Startup, task, Immediate));
            table.push(Reaction::new(resize, task, NextFrame));
            table.push(Reaction::new(fonts, task, Immediate));
            table.push(Reaction::new(TriggerSource::VisibilityRestored, task, Immediate));
        }

        let timeline = Task::SyncTimelineWidth;
        table.push(Reaction::new(TriggerSource::Startup, timeline, NextFrame));
        table.push(Reaction::new(TriggerSource::WindowResize, timeline, NextFrame));
        if caps.font_loading {
            table.push(Reaction::new(TriggerSource::FontsReady, timeline, NextFrame));
        }
        table
    }

    /// Add a reaction. Exact duplicates are ignored.
    pub fn push(&mut self, reaction: Reaction) {
        if !self.reactions.contains(&reaction) {
            self.reactions.push(reaction);
        }
    }

    /// Reactions fired by `source`.
    pub fn for_source(&self, source: TriggerSource) -> impl Iterator<Item = &Reaction> + '_ {
        self.reactions.iter().filter(move |r| r.source == source)
    }

    /// Whether anything listens to `source`. Hosts use this to decide which
    /// listeners to install.
    #[must_use]
    pub fn listens_to(&self, source: TriggerSource) -> bool {
        self.reactions.iter().any(|r| r.source == source)
    }

    /// All reactions.
    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }
}

/// Work resulting from one trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Tasks to run now, deduplicated, in table order.
    pub run_now: Vec<Task>,
    /// Whether the host must request an animation frame.
    pub request_frame: bool,
}

/// Routes triggers to tasks.
#[derive(Debug, Clone)]
pub struct Scheduler {
    table: ReactionTable,
    frames: FrameCoalescer,
}

impl Scheduler {
    #[must_use]
    pub fn new(table: ReactionTable) -> Self {
        Self {
            table,
            frames: FrameCoalescer::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &ReactionTable {
        &self.table
    }

    #[must_use]
    pub fn frames(&self) -> &FrameCoalescer {
        &self.frames
    }

    /// Handle one trigger.
    pub fn dispatch(&mut self, source: TriggerSource) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let mut deferred = FrameKinds::empty();
        for reaction in self.table.for_source(source) {
            match reaction.coalescing {
                Coalescing::Immediate => {
                    if !dispatch.run_now.contains(&reaction.task) {
                        dispatch.run_now.push(reaction.task);
                    }
                }
                Coalescing::NextFrame => deferred |= reaction.task.frame_kind(),
            }
        }
        dispatch.request_frame = self.frames.schedule(deferred);
        tracing::trace!(
            ?source,
            run_now = dispatch.run_now.len(),
            request_frame = dispatch.request_frame,
            "trigger dispatched"
        );
        dispatch
    }

    /// Handle the animation-frame callback. Returns the tasks to run.
    #[must_use]
    pub fn on_frame(&mut self) -> Vec<Task> {
        Task::from_kinds(self.frames.take_due())
    }
}
