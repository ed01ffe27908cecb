//! The navigation bar shown at the top of every page, and at the bottom on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link sits in the bottom bar on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Always visible.
    Primary,
    /// Tucked into the "More" menu.
    Overflow,
}

/// Every page in the navigation bar, in display order.
const PAGES: [(&str, &str, Slot); 8] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard", Slot::Primary),
    (endpoints::EXPENSES_VIEW, "Expenses", Slot::Primary),
    (endpoints::LIMITS_VIEW, "Limits", Slot::Primary),
    (endpoints::REWARDS_VIEW, "Rewards", Slot::Overflow),
    (endpoints::ASSISTANT_VIEW, "Assistant", Slot::Overflow),
    (endpoints::CATEGORIES_VIEW, "Categories", Slot::Overflow),
    (endpoints::PROFILE_VIEW, "Profile", Slot::Overflow),
    (endpoints::LOG_OUT, "Log out", Slot::Overflow),
];

const TOP_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:text-blue-700 dark:text-white dark:hover:text-blue-400";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-blue-700 \
    font-semibold dark:text-blue-400";

const BOTTOM_LINK_STYLE: &str = "flex w-full min-w-0 items-center justify-center \
    rounded-lg px-2.5 py-2 text-xs font-semibold text-gray-600 sm:text-sm \
    hover:bg-blue-50 hover:text-blue-700 dark:text-gray-300 dark:hover:bg-blue-900/20";
const BOTTOM_LINK_CURRENT_STYLE: &str = "flex w-full min-w-0 items-center justify-center \
    rounded-lg px-2.5 py-2 text-xs font-semibold sm:text-sm bg-blue-50 text-blue-700 \
    shadow-sm dark:bg-blue-900/30 dark:text-blue-200";

const MENU_LINK_STYLE: &str = "block rounded-lg px-3 py-2 text-gray-700 \
    hover:bg-gray-100 dark:text-gray-200 dark:hover:bg-gray-800";
const MENU_LINK_CURRENT_STYLE: &str = "block rounded-lg px-3 py-2 bg-blue-50 \
    text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

/// A link in the navigation bar. At most one link is current at a time.
#[derive(Debug, Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    slot: Slot,
    is_current: bool,
}

impl Link<'_> {
    fn view(&self, style: &str, current_style: &str) -> Markup {
        html! {
            a
                href=(self.url)
                class=(if self.is_current { current_style } else { style })
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        }
    }
}

/// The site-wide navigation bar.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'static> {
        let links = PAGES
            .iter()
            .map(|&(url, title, slot)| Link {
                url,
                title,
                slot,
                is_current: url != endpoints::LOG_OUT && url == active_endpoint,
            })
            .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        let overflow_is_current = self
            .links
            .iter()
            .any(|link| link.slot == Slot::Overflow && link.is_current);
        let links_in = |slot: Slot| self.links.iter().filter(move |link| link.slot == slot);

        html!(
            nav class="bg-white border-b border-gray-200 dark:bg-gray-900 dark:border-gray-700"
            {
                div class="max-w-screen-xl flex items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Pennywise"
                    }

                    ul class="hidden lg:flex lg:flex-row lg:space-x-8 font-medium"
                    {
                        @for link in &self.links {
                            li { (link.view(TOP_LINK_STYLE, TOP_LINK_CURRENT_STYLE)) }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Primary"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-4 gap-2 rounded-xl border border-gray-200
                    bg-white/95 p-3 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for link in links_in(Slot::Primary) {
                        li class="min-w-0" { (link.view(BOTTOM_LINK_STYLE, BOTTOM_LINK_CURRENT_STYLE)) }
                    }

                    li class="min-w-0"
                    {
                        details class="relative"
                        {
                            summary
                                class={
                                    "list-none cursor-pointer "
                                    (if overflow_is_current { BOTTOM_LINK_CURRENT_STYLE } else { BOTTOM_LINK_STYLE })
                                }
                                aria-current=[overflow_is_current.then_some("page")]
                            {
                                "More"
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 w-40 flex flex-col gap-1
                                rounded-xl border border-gray-200 bg-white p-2 text-sm shadow-xl
                                dark:border-gray-700 dark:bg-gray-900"
                            {
                                @for link in links_in(Slot::Overflow) {
                                    li { (link.view(MENU_LINK_STYLE, MENU_LINK_CURRENT_STYLE)) }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}
