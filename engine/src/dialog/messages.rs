use common::model::template::TemplateDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    Preview,
    Insert,
}

#[derive(Debug)]
pub enum Msg {
    SelectTemplate(String),
    ContentLoaded {
        generation: u64,
        purpose: FetchPurpose,
        result: Result<String, String>,
    },
    Submit,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch {
        generation: u64,
        purpose: FetchPurpose,
        descriptor: TemplateDescriptor,
    },
}
