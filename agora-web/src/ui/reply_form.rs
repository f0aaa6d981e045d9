use agora_client::{
    render::{CANCEL_LABEL, POSTING_LABEL},
    ReplyForm,
};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ReplyFormProps {
    pub form: ReplyForm,
    pub draft: String,
    pub submit_label: &'static str,
    pub on_draft: Callback<String>,
    pub on_submit: Callback<()>,

    /// Hides the cancel button when unset
    #[prop_or_default]
    pub on_cancel: Option<Callback<()>>,
}

#[function_component(ReplyFormView)]
pub fn reply_form(p: &ReplyFormProps) -> Html {
    let submitting = p.form == ReplyForm::Submitting;
    let cancel_button = p.on_cancel.as_ref().map(|on_cancel| {
        html! {
            <button
                type="button"
                class="btn btn-sm btn-light"
                disabled={ submitting }
                onclick={ on_cancel.reform(|_| ()) }
            >
                { CANCEL_LABEL }
            </button>
        }
    });
    html! {
        <form
            class="reply-form mt-2 p-2 rounded bg-light"
            onsubmit={ p.on_submit.reform(|e: SubmitEvent| e.prevent_default()) }
        >
            <textarea
                class="form-control form-control-sm"
                rows="2"
                placeholder="What are your thoughts?"
                value={ p.draft.clone() }
                disabled={ submitting }
                oninput={ p.on_draft.reform(|e: InputEvent| {
                    let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                    input.value()
                }) }
            />
            <div class="d-flex justify-content-end gap-2 mt-2">
                { for cancel_button }
                <button
                    type="submit"
                    class="btn btn-sm btn-primary"
                    disabled={ !p.form.can_submit() }
                >
                    { if submitting { POSTING_LABEL } else { p.submit_label } }
                </button>
            </div>
            { for p.form.error().map(|msg| html! {
                <p class="text-danger small mt-2">{ format!("Error: {msg}") }</p>
            }) }
        </form>
    }
}
